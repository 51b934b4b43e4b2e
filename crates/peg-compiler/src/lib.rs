//! Grammar-to-parser compiler.
//!
//! Translates a [`peg_ast::Grammar`] into a standalone parser: a JavaScript
//! (optionally TypeScript-annotated) source text that, with the bundled
//! runtime preamble, exports `parse(input, options?)`. The translation
//! interns literals and regex patterns, emits one callable per rule, and
//! wires semantic actions — opaque action bodies or structural mappings —
//! around the rules that carry them.
//!
//! # Example
//!
//! ```
//! use peg_ast::{Expr, Grammar};
//! use peg_compiler::{CompileOptions, compile};
//!
//! let mut grammar = Grammar::new();
//! grammar.define("Start", Expr::one_or_more(Expr::literal("a")));
//!
//! let source = compile(&grammar, &CompileOptions::default())?;
//! assert!(source.contains("const $L0 = $L(\"a\")"));
//! assert!(source.contains("export { parse };"));
//! # Ok::<(), peg_compiler::CompileError>(())
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]

mod emit;
/// Literal and regex interning tables.
pub mod intern;

pub use emit::{CompileError, CompileOptions, RUNTIME_JS, RUNTIME_TS, compile};
pub use intern::Interner;
