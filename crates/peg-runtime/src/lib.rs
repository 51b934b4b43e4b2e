//! PEG combinator runtime.
//!
//! A small library of primitive parsers composing into a recursive-descent
//! parser with the PEG semantic: committed, greedy, ordered-choice, with
//! backtracking only within a single alternative. Failure is the absence of
//! a result; atoms record what they expected at the rightmost failure
//! position, and the top-level entry turns that scratch into a
//! human-readable diagnostic.
//!
//! The runtime also evaluates grammar ASTs directly, with the same
//! semantics the compiled parsers emitted by `peg-compiler` have.
//!
//! # Example
//!
//! ```
//! use peg_ast::{Expr, Grammar};
//! use peg_runtime::{Parser, Value};
//!
//! let mut grammar = Grammar::new();
//! grammar.define("Start", Expr::zero_or_more(Expr::literal("a")));
//!
//! let mut parser = Parser::new(&grammar)?;
//! let value = parser.parse("aaa").map_err(|e| e.to_string())?;
//! assert_eq!(value, Value::List(vec!["a".into(), "a".into(), "a".into()]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]

/// Top-level parse entry and diagnostic rendering.
pub mod diagnostics;
mod eval;
/// Maximum-fail-position expectation tracking.
pub mod failure;
/// The combinator machine.
pub mod machine;
/// Line/column mapping for diagnostics.
pub mod position;
/// Parse state, locations, results, and values.
pub mod state;
/// Position-anchored regex compilation.
pub mod sticky;

pub use diagnostics::{ParseError, ParseOptions};
pub use failure::{Expectation, FailState};
pub use machine::{GrammarError, Parser};
pub use position::line_col;
pub use state::{Loc, Parsed, State, Value};
pub use sticky::StickyRegex;
