//! Maximum-fail-position failure tracking.
//!
//! Atoms record what they expected at the position they failed; the
//! tracker keeps only the expectations recorded at the rightmost failure
//! position seen so far. The backing buffer is reused across parses: the
//! logical length is `fail_index`, the allocation is never shrunk.

use std::fmt;

/// What an atom expected at a failure position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// An exact string.
    Literal(String),
    /// A regex, identified by its pattern source.
    Pattern(String),
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Literal(s) => f.write_str(&json_quote(s)),
            Expectation::Pattern(p) => write!(f, "/{p}/"),
        }
    }
}

/// JSON string encoding, used wherever diagnostics quote input text.
pub(crate) fn json_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}

/// Per-parser failure scratch space.
///
/// Invariant: every entry in `expected[0..fail_index]` was recorded at
/// position exactly `max_fail_pos`.
#[derive(Debug, Default)]
pub struct FailState {
    max_fail_pos: usize,
    expected: Vec<Expectation>,
    fail_index: usize,
}

impl FailState {
    /// Fresh scratch space.
    pub fn new() -> Self {
        FailState::default()
    }

    /// Clear for a new parse. Keeps the backing allocation.
    pub fn reset(&mut self) {
        self.max_fail_pos = 0;
        self.fail_index = 0;
    }

    /// Record that `expectation` failed to match at `pos`.
    ///
    /// Positions behind the rightmost failure are discarded; a position
    /// past it resets the expectation set.
    pub fn record(&mut self, pos: usize, expectation: Expectation) {
        if pos < self.max_fail_pos {
            return;
        }
        if pos > self.max_fail_pos {
            self.max_fail_pos = pos;
            self.fail_index = 0;
        }
        if self.fail_index < self.expected.len() {
            self.expected[self.fail_index] = expectation;
        } else {
            self.expected.push(expectation);
        }
        self.fail_index += 1;
    }

    /// The rightmost position any atom failed at.
    pub fn max_fail_pos(&self) -> usize {
        self.max_fail_pos
    }

    /// The expectations recorded at [`FailState::max_fail_pos`],
    /// deduplicated, in first-recorded order.
    pub fn expectations(&self) -> Vec<&Expectation> {
        let mut seen: Vec<&Expectation> = Vec::new();
        for expectation in &self.expected[..self.fail_index] {
            if !seen.contains(&expectation) {
                seen.push(expectation);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Expectation {
        Expectation::Literal(s.to_string())
    }

    #[test]
    fn keeps_only_rightmost_expectations() {
        let mut fails = FailState::new();
        fails.record(0, lit("a"));
        fails.record(2, lit("c"));
        fails.record(1, lit("b"));
        fails.record(2, lit("d"));

        assert_eq!(fails.max_fail_pos(), 2);
        assert_eq!(fails.expectations(), vec![&lit("c"), &lit("d")]);
    }

    #[test]
    fn deduplicates_at_report_time() {
        let mut fails = FailState::new();
        fails.record(3, lit("x"));
        fails.record(3, lit("x"));
        fails.record(3, Expectation::Pattern("x".into()));

        // Literal "x" and pattern /x/ are distinct expectations.
        assert_eq!(fails.expectations().len(), 2);
    }

    #[test]
    fn reset_reuses_the_buffer() {
        let mut fails = FailState::new();
        fails.record(1, lit("a"));
        fails.record(1, lit("b"));
        fails.reset();
        assert_eq!(fails.max_fail_pos(), 0);
        assert!(fails.expectations().is_empty());

        fails.record(0, lit("c"));
        assert_eq!(fails.expectations(), vec![&lit("c")]);
    }

    #[test]
    fn display_quotes_strings_and_slashes_patterns() {
        assert_eq!(lit("a\"b").to_string(), r#""a\"b""#);
        assert_eq!(Expectation::Pattern("[a-z]+".into()).to_string(), "/[a-z]+/");
    }
}
