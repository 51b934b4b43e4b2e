//! The combinator machine.
//!
//! [`Parser`] owns the per-parse scratch (failure tracking) and the compiled
//! regexes of one grammar; the primitive combinators are its methods.
//! Composite combinators are generic over closures so arbitrary parsers
//! compose exactly like grammar-driven evaluation does. All combinators take
//! a [`State`] and return `Option<Parsed>`; `None` is the only failure
//! signal. Atoms record expectations on failure; composites never do.

use std::collections::HashMap;

use peg_ast::{Expr, ExprKind, Grammar};
use thiserror::Error;

use crate::failure::{Expectation, FailState};
use crate::state::{Loc, Parsed, State, Value};
use crate::sticky::StickyRegex;

/// Errors detected when a parser is built from a grammar.
#[derive(Error, Debug)]
pub enum GrammarError {
    /// The grammar defines no rules, so there is no start rule.
    #[error("grammar has no rules")]
    EmptyGrammar,

    /// An expression references a rule the grammar never defines.
    #[error("rule `{name}` is not defined in the grammar")]
    UndefinedRule {
        /// The missing rule name.
        name: String,
    },

    /// A regex pattern was rejected by the engine.
    #[error("invalid regex pattern `{pattern}`")]
    Pattern {
        /// The offending pattern source.
        pattern: String,
        /// The engine's rejection.
        #[source]
        source: Box<regex::Error>,
    },
}

/// A parser instance over one grammar.
///
/// Construction validates rule references and compiles each distinct regex
/// pattern once. A parse mutates the instance's failure scratch, so one
/// parse runs at a time per instance; independent instances are fully
/// independent.
pub struct Parser<'g> {
    pub(crate) grammar: &'g Grammar,
    pub(crate) start: &'g str,
    regexes: HashMap<&'g str, StickyRegex>,
    pub(crate) failures: FailState,
}

impl<'g> Parser<'g> {
    /// Build a parser for `grammar`. The first rule is the start rule.
    pub fn new(grammar: &'g Grammar) -> Result<Self, GrammarError> {
        let start = grammar.start().ok_or(GrammarError::EmptyGrammar)?;
        let mut regexes = HashMap::new();
        for rule in grammar.rules() {
            collect_atoms(&rule.expr, grammar, &mut regexes)?;
        }
        Ok(Parser { grammar, start: &start.name, regexes, failures: FailState::new() })
    }

    /// The failure scratch, exposed for diagnostics and inspection.
    pub fn failures(&self) -> &FailState {
        &self.failures
    }

    /// Record a failed expectation, per the maximum-fail-position rule.
    pub fn fail(&mut self, pos: usize, expectation: Expectation) {
        self.failures.record(pos, expectation);
    }

    /// Literal string match. The value is the literal itself.
    pub fn literal(&mut self, state: State<'_>, expected: &str) -> Option<Parsed> {
        if state.rest().starts_with(expected) {
            Some(Parsed {
                loc: Loc { pos: state.pos, length: expected.len() },
                pos: state.pos + expected.len(),
                value: Value::Str(expected.to_string()),
            })
        } else {
            self.failures.record(state.pos, Expectation::Literal(expected.to_string()));
            None
        }
    }

    /// Sticky regex match. The value is the match array: full match first,
    /// then capture groups, `Null` for groups that did not participate.
    pub fn regex(&mut self, state: State<'_>, re: &StickyRegex) -> Option<Parsed> {
        let matched = regex_match(re, state);
        if matched.is_none() {
            self.failures.record(state.pos, Expectation::Pattern(re.source().to_string()));
        }
        matched
    }

    /// Grammar-interned variant of [`Parser::regex`], keyed by pattern
    /// source.
    pub(crate) fn regex_pattern(&mut self, state: State<'_>, pattern: &str) -> Option<Parsed> {
        debug_assert!(self.regexes.contains_key(pattern), "pattern not interned: {pattern}");
        let matched = self.regexes.get(pattern).and_then(|re| regex_match(re, state));
        if matched.is_none() {
            self.failures.record(state.pos, Expectation::Pattern(pattern.to_string()));
        }
        matched
    }

    /// Ordered choice: first succeeding alternative wins. Fail records left
    /// behind by rejected alternatives are kept; recording self-filters by
    /// position, so the rightmost attempt wins in diagnostics regardless.
    pub fn choice<'a, F>(&mut self, state: State<'a>, count: usize, mut alternative: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>, usize) -> Option<Parsed>,
    {
        for index in 0..count {
            if let Some(result) = alternative(self, state, index) {
                return Some(result);
            }
        }
        None
    }

    /// Sequence: threads the position left to right; any sub-failure fails
    /// the whole sequence. The value is the list of sub-values and the loc
    /// spans start to final position.
    pub fn sequence<'a, F>(&mut self, state: State<'a>, count: usize, mut item: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>, usize) -> Option<Parsed>,
    {
        let mut pos = state.pos;
        let mut values = Vec::with_capacity(count);
        for index in 0..count {
            let result = item(self, state.at(pos), index)?;
            pos = result.pos;
            values.push(result.value);
        }
        Some(Parsed {
            loc: Loc { pos: state.pos, length: pos - state.pos },
            pos,
            value: Value::List(values),
        })
    }

    /// Zero-or-more repetition. Always succeeds. A zero-width sub-match
    /// terminates the loop without appending its value, so nullable
    /// sub-expressions cannot loop forever.
    pub fn zero_or_more<'a, F>(&mut self, state: State<'a>, mut item: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>) -> Option<Parsed>,
    {
        let mut pos = state.pos;
        let mut values = Vec::new();
        while let Some(result) = item(self, state.at(pos)) {
            if result.pos == pos {
                break;
            }
            pos = result.pos;
            values.push(result.value);
        }
        Some(Parsed {
            loc: Loc { pos: state.pos, length: pos - state.pos },
            pos,
            value: Value::List(values),
        })
    }

    /// One-or-more repetition: fails iff the first attempt fails, then
    /// behaves as [`Parser::zero_or_more`].
    pub fn one_or_more<'a, F>(&mut self, state: State<'a>, mut item: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>) -> Option<Parsed>,
    {
        let first = item(self, state)?;
        if first.pos == state.pos {
            return Some(Parsed {
                loc: Loc { pos: state.pos, length: 0 },
                pos: state.pos,
                value: Value::List(Vec::new()),
            });
        }
        let mut pos = first.pos;
        let mut values = vec![first.value];
        while let Some(result) = item(self, state.at(pos)) {
            if result.pos == pos {
                break;
            }
            pos = result.pos;
            values.push(result.value);
        }
        Some(Parsed {
            loc: Loc { pos: state.pos, length: pos - state.pos },
            pos,
            value: Value::List(values),
        })
    }

    /// Optional: a failure becomes a zero-width success with an absent
    /// value.
    pub fn optional<'a, F>(&mut self, state: State<'a>, mut item: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>) -> Option<Parsed>,
    {
        match item(self, state) {
            Some(result) => Some(result),
            None => Some(Parsed::empty_at(state.pos)),
        }
    }

    /// Text capture: replaces the sub-result's value with the literal
    /// matched span.
    pub fn text<'a, F>(&mut self, state: State<'a>, mut item: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>) -> Option<Parsed>,
    {
        let mut result = item(self, state)?;
        result.value = Value::Str(state.input[state.pos..result.pos].to_string());
        Some(result)
    }

    /// Positive lookahead: zero-width success when the sub-expression
    /// matches; the position does not advance.
    pub fn lookahead<'a, F>(&mut self, state: State<'a>, mut item: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>) -> Option<Parsed>,
    {
        item(self, state)?;
        Some(Parsed::empty_at(state.pos))
    }

    /// Negative lookahead: succeeds (zero-width) iff the sub-expression
    /// fails.
    pub fn negative_lookahead<'a, F>(&mut self, state: State<'a>, mut item: F) -> Option<Parsed>
    where
        F: FnMut(&mut Self, State<'a>) -> Option<Parsed>,
    {
        match item(self, state) {
            Some(_) => None,
            None => Some(Parsed::empty_at(state.pos)),
        }
    }
}

fn regex_match(re: &StickyRegex, state: State<'_>) -> Option<Parsed> {
    let caps = re.captures_at(state.input, state.pos)?;
    let length = caps.get(0).map_or(0, |m| m.end());
    let value = Value::List(
        caps.iter()
            .map(|group| match group {
                Some(m) => Value::Str(m.as_str().to_string()),
                None => Value::Null,
            })
            .collect(),
    );
    Some(Parsed { loc: Loc { pos: state.pos, length }, pos: state.pos + length, value })
}

fn collect_atoms<'g>(
    expr: &'g Expr,
    grammar: &Grammar,
    regexes: &mut HashMap<&'g str, StickyRegex>,
) -> Result<(), GrammarError> {
    match &expr.kind {
        ExprKind::Literal(_) => {}
        ExprKind::Regex(pattern) => {
            if !regexes.contains_key(pattern.as_str()) {
                let compiled = StickyRegex::new(pattern).map_err(|source| GrammarError::Pattern {
                    pattern: pattern.clone(),
                    source: Box::new(source),
                })?;
                regexes.insert(pattern, compiled);
            }
        }
        ExprKind::Sequence(items) | ExprKind::Choice(items) => {
            for item in items {
                collect_atoms(item, grammar, regexes)?;
            }
        }
        ExprKind::ZeroOrMore(item)
        | ExprKind::OneOrMore(item)
        | ExprKind::Optional(item)
        | ExprKind::Text(item)
        | ExprKind::Lookahead(item)
        | ExprKind::NotLookahead(item) => collect_atoms(item, grammar, regexes)?,
        ExprKind::Ref(name) => {
            if grammar.get(name).is_none() {
                return Err(GrammarError::UndefinedRule { name: name.clone() });
            }
        }
    }
    Ok(())
}
