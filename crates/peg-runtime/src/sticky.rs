//! Sticky (position-anchored) regex compilation.

use regex::{Captures, Regex};

/// A regex compiled to match only at a given starting position, never
/// scanning forward: the pattern source is wrapped as `(?s)^(?:…)` and run
/// against the input slice starting at the position. Dot matches all and
/// matching is Unicode-aware, equivalent to the `suy` flag set of the
/// emitted parsers.
#[derive(Debug, Clone)]
pub struct StickyRegex {
    source: String,
    regex: Regex,
}

impl StickyRegex {
    /// Compile a pattern source. Patterns the engine rejects (for example
    /// lookaround) are reported here, not at match time.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?s)^(?:{pattern})"))?;
        Ok(StickyRegex { source: pattern.to_string(), regex })
    }

    /// The original pattern source, without the anchoring wrapper.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match at exactly `pos`. Group offsets in the returned captures are
    /// relative to `pos`.
    pub fn captures_at<'h>(&self, input: &'h str, pos: usize) -> Option<Captures<'h>> {
        self.regex.captures(&input[pos..])
    }
}
