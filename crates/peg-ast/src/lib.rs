//! Parse-expression AST for the PEG toolkit.
//!
//! This crate is the shared vocabulary between the combinator runtime
//! (`peg-runtime`), which evaluates grammars directly, and the compiler
//! (`peg-compiler`), which translates them into standalone parser source.
//!
//! A grammar is an ordered list of named rules; the first rule is the start
//! rule. Each rule body is an [`Expr`] tree over the ten PEG operators
//! (literal, regex, sequence, ordered choice, repetitions, optional,
//! text-capture, lookaheads) plus late-bound references to other rules.
//! Rules and choice alternatives may carry a semantic action ([`Handler`]):
//! either an opaque target-language body or a structural [`Mapping`] that
//! rearranges the captured value.
//!
//! The canonical interchange form is JSON (`[op, args, handler?]` nodes,
//! bare strings for rule references); see [`Grammar::from_json`].

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]

mod expr;
mod handler;
mod json;

pub use expr::{Expr, ExprKind, Grammar, Rule};
pub use handler::{Handler, Mapping};
pub use json::AstError;
