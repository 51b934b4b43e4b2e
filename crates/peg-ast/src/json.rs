//! Canonical JSON encoding of grammars.
//!
//! A grammar is a JSON object mapping rule names to expression nodes, in
//! rule order. An expression node is either a bare string (a rule
//! reference) or a tagged array `[op, args]` / `[op, args, handler]`:
//!
//! ```text
//! ["L", "if"]                      literal
//! ["R", "[a-z]+"]                  regex pattern source
//! ["S", [node, node, ...]]         sequence
//! ["/", [node, node, ...]]         ordered choice
//! ["*", node]  ["+", node]  ["?", node]
//! ["$", node]  ["&", node]  ["!", node]
//! ```
//!
//! A handler is `{"f": "<action body>"}` or a structural mapping (string,
//! integer, or nested array of mappings).

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::expr::{Expr, ExprKind, Grammar};
use crate::handler::{Handler, Mapping};

/// Errors decoding the canonical JSON form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstError {
    /// The node's tag is not one of the ten operators.
    #[error("unknown AST operator `{0}`")]
    UnknownOperator(String),

    /// A node or its arguments do not have the shape the tag requires.
    #[error("malformed AST node: {0}")]
    Malformed(String),

    /// A structural mapping is not a string, integer, or array of mappings.
    #[error("invalid structural mapping: {0}")]
    InvalidMapping(String),

    /// The grammar document is not a JSON object of rules.
    #[error("grammar must be a JSON object mapping rule names to nodes")]
    NotAnObject,
}

impl Grammar {
    /// Decode a grammar from its canonical JSON object. Rule order is the
    /// object's key order; the first rule is the start rule.
    pub fn from_json(value: &Value) -> Result<Self, AstError> {
        let object = value.as_object().ok_or(AstError::NotAnObject)?;
        let mut grammar = Grammar::new();
        for (name, node) in object {
            grammar.define(name.clone(), Expr::from_json(node)?);
        }
        Ok(grammar)
    }

    /// Encode the grammar back to its canonical JSON object.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for rule in self.rules() {
            object.insert(rule.name.clone(), rule.expr.to_json());
        }
        Value::Object(object)
    }
}

impl Expr {
    /// Decode a single expression node.
    pub fn from_json(value: &Value) -> Result<Self, AstError> {
        let items = match value {
            Value::String(name) => return Ok(Expr::rule(name.clone())),
            Value::Array(items) => items,
            other => {
                return Err(AstError::Malformed(format!(
                    "expected tagged array or rule-reference string, got {other}"
                )));
            }
        };

        let op = items
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| AstError::Malformed("node tag must be a string".into()))?;
        let args = items
            .get(1)
            .ok_or_else(|| AstError::Malformed(format!("`{op}` node is missing its arguments")))?;
        if items.len() > 3 {
            return Err(AstError::Malformed(format!(
                "`{op}` node has {} elements, expected at most 3",
                items.len()
            )));
        }

        let kind = match op {
            "L" => ExprKind::Literal(string_arg(op, args)?),
            "R" => ExprKind::Regex(string_arg(op, args)?),
            "S" => ExprKind::Sequence(list_args(op, args)?),
            "/" => ExprKind::Choice(list_args(op, args)?),
            "*" => ExprKind::ZeroOrMore(Box::new(Expr::from_json(args)?)),
            "+" => ExprKind::OneOrMore(Box::new(Expr::from_json(args)?)),
            "?" => ExprKind::Optional(Box::new(Expr::from_json(args)?)),
            "$" => ExprKind::Text(Box::new(Expr::from_json(args)?)),
            "&" => ExprKind::Lookahead(Box::new(Expr::from_json(args)?)),
            "!" => ExprKind::NotLookahead(Box::new(Expr::from_json(args)?)),
            other => return Err(AstError::UnknownOperator(other.to_string())),
        };

        let handler = match items.get(2) {
            Some(h) => Some(Handler::from_json(h)?),
            None => None,
        };

        Ok(Expr { kind, handler })
    }

    /// Encode this expression node.
    pub fn to_json(&self) -> Value {
        let (op, args) = match &self.kind {
            ExprKind::Literal(s) => ("L", json!(s)),
            ExprKind::Regex(p) => ("R", json!(p)),
            ExprKind::Sequence(items) => {
                ("S", Value::Array(items.iter().map(Expr::to_json).collect()))
            }
            ExprKind::Choice(items) => {
                ("/", Value::Array(items.iter().map(Expr::to_json).collect()))
            }
            ExprKind::ZeroOrMore(e) => ("*", e.to_json()),
            ExprKind::OneOrMore(e) => ("+", e.to_json()),
            ExprKind::Optional(e) => ("?", e.to_json()),
            ExprKind::Text(e) => ("$", e.to_json()),
            ExprKind::Lookahead(e) => ("&", e.to_json()),
            ExprKind::NotLookahead(e) => ("!", e.to_json()),
            ExprKind::Ref(name) => return json!(name),
        };
        match &self.handler {
            Some(h) => json!([op, args, h.to_json()]),
            None => json!([op, args]),
        }
    }
}

fn string_arg(op: &str, args: &Value) -> Result<String, AstError> {
    args.as_str()
        .map(str::to_string)
        .ok_or_else(|| AstError::Malformed(format!("`{op}` arguments must be a string")))
}

fn list_args(op: &str, args: &Value) -> Result<Vec<Expr>, AstError> {
    let items = args
        .as_array()
        .ok_or_else(|| AstError::Malformed(format!("`{op}` arguments must be an array")))?;
    items.iter().map(Expr::from_json).collect()
}

impl Handler {
    /// Decode a handler: `{"f": body}` or a structural mapping.
    pub fn from_json(value: &Value) -> Result<Self, AstError> {
        if let Some(object) = value.as_object() {
            let body = object
                .get("f")
                .and_then(Value::as_str)
                .ok_or_else(|| AstError::Malformed("action handler must be {\"f\": body}".into()))?;
            return Ok(Handler::Action(body.to_string()));
        }
        Ok(Handler::Mapping(Mapping::from_json(value)?))
    }

    /// Encode this handler.
    pub fn to_json(&self) -> Value {
        match self {
            Handler::Action(body) => json!({ "f": body }),
            Handler::Mapping(mapping) => mapping.to_json(),
        }
    }
}

impl Mapping {
    /// Decode a structural mapping.
    pub fn from_json(value: &Value) -> Result<Self, AstError> {
        match value {
            Value::String(s) => Ok(Mapping::Str(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Mapping::Index)
                .ok_or_else(|| AstError::InvalidMapping(format!("non-integer index {n}"))),
            Value::Array(items) => {
                let items = items.iter().map(Mapping::from_json).collect::<Result<_, _>>()?;
                Ok(Mapping::List(items))
            }
            other => Err(AstError::InvalidMapping(other.to_string())),
        }
    }

    /// Encode this mapping.
    pub fn to_json(&self) -> Value {
        match self {
            Mapping::Str(s) => json!(s),
            Mapping::Index(n) => json!(n),
            Mapping::List(items) => Value::Array(items.iter().map(Mapping::to_json).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn decodes_tagged_nodes() {
        let node = json!(["S", [["L", "a"], ["R", "[0-9]+"], "Other"]]);
        let expr = Expr::from_json(&node).unwrap();
        assert_eq!(
            expr,
            Expr::sequence(vec![
                Expr::literal("a"),
                Expr::regex("[0-9]+"),
                Expr::rule("Other"),
            ])
        );
    }

    #[test]
    fn decodes_handlers() {
        let functional = json!(["S", [["L", "a"]], { "f": "$1" }]);
        let expr = Expr::from_json(&functional).unwrap();
        assert_eq!(expr.handler, Some(Handler::action("$1")));

        let structural = json!(["S", [["L", "a"], ["L", "b"]], [2, 1, "lit"]]);
        let expr = Expr::from_json(&structural).unwrap();
        assert_eq!(
            expr.handler,
            Some(Handler::Mapping(Mapping::List(vec![
                Mapping::Index(2),
                Mapping::Index(1),
                Mapping::Str("lit".into()),
            ])))
        );
    }

    #[test]
    fn rejects_unknown_operator() {
        let node = json!(["%", "a"]);
        assert_eq!(Expr::from_json(&node), Err(AstError::UnknownOperator("%".into())));
    }

    #[test]
    fn rejects_malformed_nodes() {
        assert!(Expr::from_json(&json!(["L"])).is_err());
        assert!(Expr::from_json(&json!(["S", "not-a-list"])).is_err());
        assert!(Expr::from_json(&json!(42)).is_err());
        assert!(Expr::from_json(&json!(["L", "a", 1, "extra"])).is_err());
    }

    #[test]
    fn rejects_bad_mappings() {
        assert!(Mapping::from_json(&json!(true)).is_err());
        assert!(Mapping::from_json(&json!(1.5)).is_err());
        assert!(Mapping::from_json(&json!([1, [true]])).is_err());
    }

    #[test]
    fn grammar_round_trips_and_keeps_order() {
        let doc = json!({
            "Start": ["/", [["L", "a"], "Tail"]],
            "Tail": ["*", ["R", "b"]],
        });
        let grammar = Grammar::from_json(&doc).unwrap();
        assert_eq!(grammar.start().map(|r| r.name.as_str()), Some("Start"));
        assert_eq!(grammar.to_json(), doc);
    }

    #[test]
    fn grammar_rejects_non_objects() {
        assert_eq!(Grammar::from_json(&json!([1, 2])), Err(AstError::NotAnObject));
    }
}
