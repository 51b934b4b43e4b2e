//! Top-level parse entry and its diagnostics.

use thiserror::Error;
use tracing::debug;

use crate::failure::json_quote;
use crate::machine::Parser;
use crate::position::line_col;
use crate::state::{State, Value};

/// Default label when the caller supplies no filename.
const DEFAULT_FILENAME: &str = "input";

/// Options for a single parse invocation.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Label used in diagnostics, typically the source file name.
    pub filename: Option<String>,
}

/// A fatal parse outcome. `Display` renders the full diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No alternative of the start rule matched.
    #[error(
        "{filename}:{line}:{column} Failed to parse\nExpected:\n{}\nFound: {found}",
        indent_expected(.expected)
    )]
    Failed {
        /// Diagnostic label.
        filename: String,
        /// 1-based line of the rightmost failure.
        line: usize,
        /// 1-based column of the rightmost failure.
        column: usize,
        /// Deduplicated expectations, already pretty-printed.
        expected: Vec<String>,
        /// A short look-ahead at the failure position, JSON-quoted, or
        /// `EOF`.
        found: String,
    },

    /// The start rule matched a prefix but input remained.
    #[error("{filename}:{line}:{column} Unconsumed input at {line}:{column}\n\n{rest}")]
    Unconsumed {
        /// Diagnostic label.
        filename: String,
        /// 1-based line where parsing stopped.
        line: usize,
        /// 1-based column where parsing stopped.
        column: usize,
        /// The unparsed remainder.
        rest: String,
    },
}

fn indent_expected(expected: &[String]) -> String {
    expected.iter().map(|e| format!("    {e}")).collect::<Vec<_>>().join("\n")
}

/// The short look-ahead shown as `Found:`: the run of non-whitespace (or
/// whitespace) starting at `pos`, JSON-quoted; `EOF` at the end of input.
fn hint(input: &str, pos: usize) -> String {
    let rest = &input[pos.min(input.len())..];
    let mut chars = rest.chars();
    let Some(first) = chars.next() else {
        return "EOF".to_string();
    };
    let in_space = first.is_whitespace();
    let end = rest
        .char_indices()
        .find(|(_, c)| c.is_whitespace() != in_space)
        .map_or(rest.len(), |(i, _)| i);
    json_quote(&rest[..end])
}

impl Parser<'_> {
    /// Parse `input` from the start rule, requiring the entire input to be
    /// consumed.
    pub fn parse(&mut self, input: &str) -> Result<Value, ParseError> {
        self.parse_with(input, &ParseOptions::default())
    }

    /// [`Parser::parse`] with diagnostic options.
    pub fn parse_with(&mut self, input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
        debug!(start = self.start, input_len = input.len(), "parse");
        self.failures.reset();
        let start = self.start;
        let result = self.eval_rule(State::new(input), start);

        let filename =
            options.filename.clone().unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        match result {
            Some(parsed) if parsed.pos == input.len() => Ok(parsed.value),
            Some(parsed) => {
                let (line, column) = line_col(input, parsed.pos);
                Err(ParseError::Unconsumed {
                    filename,
                    line,
                    column,
                    rest: input[parsed.pos..].to_string(),
                })
            }
            None => {
                let pos = self.failures.max_fail_pos();
                let (line, column) = line_col(input, pos);
                Err(ParseError::Failed {
                    filename,
                    line,
                    column,
                    expected: self.failures().expectations().iter().map(ToString::to_string).collect(),
                    found: hint(input, pos),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_takes_the_leading_token() {
        assert_eq!(hint("abc def", 0), "\"abc\"");
        assert_eq!(hint("abc def", 3), "\" \"");
        assert_eq!(hint("abc", 3), "EOF");
        assert_eq!(hint("", 0), "EOF");
    }

    #[test]
    fn hint_quotes_specials() {
        assert_eq!(hint("a\"b", 0), r#""a\"b""#);
    }
}
