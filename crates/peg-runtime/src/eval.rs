//! Direct grammar evaluation.
//!
//! Walks the expression tree against the combinator machine with the same
//! semantics a compiled parser has: per-rule dispatch through the rule
//! table (so references late-bind and rules may recurse), rule-level and
//! per-alternative handler application, and the default regex-to-string
//! transform for bare regexes in handler-less positions.

use peg_ast::{Expr, ExprKind, Handler, Mapping};
use tracing::{trace, warn};

use crate::machine::Parser;
use crate::state::{Parsed, State, Value};

/// The operator shape a structural mapping indexes against.
///
/// Sequences are indexed 1-based (`1` is the first element), regex match
/// arrays 0-based (`0` is the full match, `1` the first group); every other
/// capture is a scalar, where a number selects the value itself.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Sequence,
    Regex,
    Scalar,
}

impl Shape {
    fn of(kind: &ExprKind) -> Self {
        match kind {
            ExprKind::Sequence(_) => Shape::Sequence,
            ExprKind::Regex(_) => Shape::Regex,
            _ => Shape::Scalar,
        }
    }
}

impl<'g> Parser<'g> {
    /// Evaluate the named rule at `state`.
    pub(crate) fn eval_rule<'a>(&mut self, state: State<'a>, name: &str) -> Option<Parsed> {
        trace!(rule = name, pos = state.pos, "evaluate rule");
        let grammar = self.grammar;
        let expr = grammar.get(name)?;

        // A top-level choice without an outer handler is the one place
        // alternatives carry handlers of their own.
        if let (ExprKind::Choice(alternatives), None) = (&expr.kind, &expr.handler) {
            for alternative in alternatives {
                let default = alternative.handler.is_none();
                if let Some(result) = self.eval(state, alternative, default) {
                    return Some(apply_handler(alternative, result));
                }
            }
            return None;
        }

        let default = expr.handler.is_none();
        let result = self.eval(state, expr, default)?;
        Some(apply_handler(expr, result))
    }

    /// Evaluate one expression node. `default_handler` marks a handler-less
    /// position: there, a bare regex reduces to its full-match string. The
    /// flag flows through choices and sequences but not through the one-arg
    /// operators, matching the compiler's (bug-compatible) policy.
    fn eval<'a>(&mut self, state: State<'a>, expr: &'g Expr, default_handler: bool) -> Option<Parsed> {
        match &expr.kind {
            ExprKind::Literal(s) => self.literal(state, s),
            ExprKind::Regex(pattern) => {
                let result = self.regex_pattern(state, pattern);
                if default_handler {
                    result.map(|mut r| {
                        r.value = full_match(r.value);
                        r
                    })
                } else {
                    result
                }
            }
            ExprKind::Sequence(items) => {
                self.sequence(state, items.len(), |p, st, i| p.eval(st, &items[i], default_handler))
            }
            ExprKind::Choice(alternatives) => self.choice(state, alternatives.len(), |p, st, i| {
                p.eval(st, &alternatives[i], default_handler)
            }),
            ExprKind::ZeroOrMore(item) => self.zero_or_more(state, |p, st| p.eval(st, item, false)),
            ExprKind::OneOrMore(item) => self.one_or_more(state, |p, st| p.eval(st, item, false)),
            ExprKind::Optional(item) => self.optional(state, |p, st| p.eval(st, item, false)),
            ExprKind::Text(item) => self.text(state, |p, st| p.eval(st, item, false)),
            ExprKind::Lookahead(item) => self.lookahead(state, |p, st| p.eval(st, item, false)),
            ExprKind::NotLookahead(item) => {
                self.negative_lookahead(state, |p, st| p.eval(st, item, false))
            }
            ExprKind::Ref(name) => self.eval_rule(state, name),
        }
    }
}

/// Reduce a regex match array to its full-match string.
fn full_match(value: Value) -> Value {
    match value {
        Value::List(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    }
}

fn apply_handler(expr: &Expr, mut result: Parsed) -> Parsed {
    let Some(handler) = &expr.handler else {
        return result;
    };
    match handler {
        Handler::Action(_) => {
            // Action bodies are target-language text; only compiled parsers
            // can run them.
            warn!("functional handler ignored during direct evaluation");
            result
        }
        Handler::Mapping(mapping) => {
            let shape = Shape::of(&expr.kind);
            result.value = apply_mapping(mapping, &result.value, shape);
            result
        }
    }
}

fn apply_mapping(mapping: &Mapping, value: &Value, shape: Shape) -> Value {
    match mapping {
        Mapping::Str(s) => Value::Str(s.clone()),
        Mapping::Index(n) => match shape {
            Shape::Scalar => value.clone(),
            Shape::Sequence => index_value(value, n - 1),
            Shape::Regex => index_value(value, *n),
        },
        Mapping::List(items) => {
            Value::List(items.iter().map(|m| apply_mapping(m, value, shape)).collect())
        }
    }
}

/// JS-style indexing: anything out of range is the absent value.
fn index_value(value: &Value, index: i64) -> Value {
    let Ok(index) = usize::try_from(index) else {
        return Value::Null;
    };
    match value {
        Value::List(items) => items.get(index).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
