//! Parse expressions and grammars.

use crate::handler::Handler;

/// A parse expression together with its optional semantic action.
///
/// Handlers are only acted upon at rule level, or on the direct alternatives
/// of a rule whose body is a choice; a handler attached anywhere deeper is
/// inert in both the compiler and the direct evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The operator and its operands.
    pub kind: ExprKind,
    /// Optional semantic action post-processing the successful result.
    pub handler: Option<Handler>,
}

/// The PEG operators.
///
/// Tags in the canonical JSON form are given in parentheses.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// String literal (`L`). Matches iff the input at the current position
    /// starts with the exact string.
    Literal(String),
    /// Sticky regex (`R`). The pattern source; matching is anchored at the
    /// current position, dot-matches-all, Unicode-aware.
    Regex(String),
    /// Sequence (`S`). All sub-expressions in order; the value is the list
    /// of sub-values.
    Sequence(Vec<Expr>),
    /// Ordered choice (`/`). First succeeding alternative wins; committed.
    Choice(Vec<Expr>),
    /// Zero-or-more (`*`). Always succeeds; a zero-width sub-match
    /// terminates the repetition.
    ZeroOrMore(Box<Expr>),
    /// One-or-more (`+`). Fails iff the first attempt fails.
    OneOrMore(Box<Expr>),
    /// Optional (`?`). Failure becomes a zero-width success with an absent
    /// value.
    Optional(Box<Expr>),
    /// Text capture (`$`). Replaces the sub-value with the matched span.
    Text(Box<Expr>),
    /// Positive lookahead (`&`). Zero-width; the value is absent.
    Lookahead(Box<Expr>),
    /// Negative lookahead (`!`). Succeeds iff the sub-expression fails.
    NotLookahead(Box<Expr>),
    /// Reference to another rule by name, resolved late so rules may be
    /// mutually recursive and defined in any order.
    Ref(String),
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Expr { kind, handler: None }
    }

    /// A string literal expression.
    pub fn literal(s: impl Into<String>) -> Self {
        Expr::new(ExprKind::Literal(s.into()))
    }

    /// A sticky-regex expression from a pattern source.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Expr::new(ExprKind::Regex(pattern.into()))
    }

    /// A sequence of sub-expressions.
    pub fn sequence(items: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Sequence(items))
    }

    /// An ordered choice over alternatives.
    pub fn choice(alternatives: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Choice(alternatives))
    }

    /// Zero-or-more repetition.
    pub fn zero_or_more(item: Expr) -> Self {
        Expr::new(ExprKind::ZeroOrMore(Box::new(item)))
    }

    /// One-or-more repetition.
    pub fn one_or_more(item: Expr) -> Self {
        Expr::new(ExprKind::OneOrMore(Box::new(item)))
    }

    /// Optional match.
    pub fn optional(item: Expr) -> Self {
        Expr::new(ExprKind::Optional(Box::new(item)))
    }

    /// Text capture of the span matched by `item`.
    pub fn text(item: Expr) -> Self {
        Expr::new(ExprKind::Text(Box::new(item)))
    }

    /// Positive lookahead.
    pub fn lookahead(item: Expr) -> Self {
        Expr::new(ExprKind::Lookahead(Box::new(item)))
    }

    /// Negative lookahead.
    pub fn not_lookahead(item: Expr) -> Self {
        Expr::new(ExprKind::NotLookahead(Box::new(item)))
    }

    /// A late-bound reference to the rule `name`.
    pub fn rule(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Ref(name.into()))
    }

    /// Attach a semantic action.
    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }
}

/// A named grammar rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// The rule name other expressions reference.
    pub name: String,
    /// The rule body.
    pub expr: Expr,
}

/// An ordered collection of rules. The first rule is the start rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// An empty grammar.
    pub fn new() -> Self {
        Grammar::default()
    }

    /// Define a rule. Redefining an existing name replaces its body in
    /// place, keeping the original position in rule order.
    pub fn define(&mut self, name: impl Into<String>, expr: Expr) -> &mut Self {
        let name = name.into();
        match self.rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => rule.expr = expr,
            None => self.rules.push(Rule { name, expr }),
        }
        self
    }

    /// The start rule, when the grammar is non-empty.
    pub fn start(&self) -> Option<&Rule> {
        self.rules.first()
    }

    /// Look up a rule body by name.
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.rules.iter().find(|r| r.name == name).map(|r| &r.expr)
    }

    /// All rules in definition order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether the grammar has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_replaces_in_place() {
        let mut g = Grammar::new();
        g.define("Start", Expr::rule("Word"));
        g.define("Word", Expr::regex("[a-z]+"));
        g.define("Start", Expr::literal("x"));

        assert_eq!(g.len(), 2);
        let start = g.start().map(|r| r.name.as_str());
        assert_eq!(start, Some("Start"));
        assert_eq!(g.get("Start"), Some(&Expr::literal("x")));
    }

    #[test]
    fn lookup_misses_unknown_rules() {
        let mut g = Grammar::new();
        g.define("Start", Expr::literal("a"));
        assert!(g.get("Missing").is_none());
    }
}
