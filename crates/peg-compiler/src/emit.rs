//! Translation of grammar ASTs into parser source.
//!
//! The emitted artifact is JavaScript (optionally TypeScript-annotated)
//! targeting the combinator runtime preamble: one function per rule, a
//! driver built over the rule table, and interned `$L<i>` / `$R<i>`
//! declarations shared by every use site.

use peg_ast::{Expr, ExprKind, Grammar, Handler, Mapping};
use thiserror::Error;
use tracing::debug;

use crate::intern::Interner;

/// The annotation-free runtime preamble.
pub const RUNTIME_JS: &str = include_str!("assets/runtime.js");
/// The TypeScript-annotated runtime preamble.
pub const RUNTIME_TS: &str = include_str!("assets/runtime.ts");

/// Compilation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Emit TypeScript type annotations (and the typed runtime preamble).
    pub types: bool,
}

/// Fatal compilation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The grammar defines no rules, so there is no start rule to export.
    #[error("grammar has no rules")]
    EmptyGrammar,

    /// A rule name cannot be emitted as an identifier in generated source.
    #[error("rule name `{name}` is not a valid identifier in generated source")]
    InvalidRuleName {
        /// The offending name.
        name: String,
    },

    /// An expression references a rule the grammar never defines.
    #[error("rule `{name}` is not defined in the grammar")]
    UndefinedRule {
        /// The missing rule name.
        name: String,
    },
}

/// Compile `grammar` into a standalone parser source text. The first rule
/// is the start rule; the artifact exports its `parse` entry.
pub fn compile(grammar: &Grammar, options: &CompileOptions) -> Result<String, CompileError> {
    debug!(rules = grammar.len(), types = options.types, "compile grammar");
    if grammar.is_empty() {
        return Err(CompileError::EmptyGrammar);
    }
    for rule in grammar.rules() {
        check_identifier(&rule.name)?;
        check_references(&rule.expr, grammar)?;
    }

    let mut codegen = Codegen { interner: Interner::new(), types: options.types };
    let rules: Vec<String> = grammar
        .rules()
        .iter()
        .map(|rule| codegen.compile_rule(&rule.name, &rule.expr))
        .collect();

    let names: Vec<&str> = grammar.rules().iter().map(|r| r.name.as_str()).collect();
    let mut out = String::new();
    out.push_str(if options.types { RUNTIME_TS } else { RUNTIME_JS });
    out.push('\n');
    out.push_str(&format!("const {{ parse, fail }} = parserState({{ {} }});\n", names.join(", ")));
    out.push('\n');
    for (i, literal) in codegen.interner.literals().iter().enumerate() {
        out.push_str(&format!("const $L{i} = $L({});\n", js_string(literal)));
    }
    for (i, pattern) in codegen.interner.regexes().iter().enumerate() {
        out.push_str(&format!("const $R{i} = $R(new RegExp({}, 'suy'));\n", js_string(pattern)));
    }
    out.push('\n');
    for rule in &rules {
        out.push_str(rule);
        out.push('\n');
    }
    out.push_str("export { parse };\n");
    Ok(out)
}

struct Codegen {
    interner: Interner,
    types: bool,
}

impl Codegen {
    fn compile_rule(&mut self, name: &str, expr: &Expr) -> String {
        // A top-level choice without an outer handler is split into one
        // parser per alternative so each can carry its own handler.
        if let (ExprKind::Choice(alternatives), None) = (&expr.kind, &expr.handler) {
            let mut defs = String::new();
            let mut terms = Vec::with_capacity(alternatives.len());
            for (i, alternative) in alternatives.iter().enumerate() {
                let alt_name = format!("{name}_{i}");
                let parser = self.compile_op(alternative, name, alternative.handler.is_none());
                defs.push_str(&format!("const {alt_name} = {parser};\n"));
                match &alternative.handler {
                    Some(handler) => {
                        let handler_src = self.handler_src(&alternative.kind, handler);
                        defs.push_str(&format!("const {alt_name}_handler = {handler_src};\n"));
                        terms.push(format!("{alt_name}_handler({alt_name}(state))"));
                    }
                    None => terms.push(format!("{alt_name}(state)")),
                }
            }
            return format!(
                "{defs}{signature} {{\n  return {body};\n}}\n",
                signature = self.rule_signature(name),
                body = terms.join("\n    || "),
            );
        }

        let parser = self.compile_op(expr, name, expr.handler.is_none());
        match &expr.handler {
            Some(handler) => {
                let handler_src = self.handler_src(&expr.kind, handler);
                format!(
                    "const {name}_handler = {handler_src};\n{signature} {{\n  return {name}_handler({parser}(state));\n}}\n",
                    signature = self.rule_signature(name),
                )
            }
            None => format!(
                "{signature} {{\n  return {parser}(state);\n}}\n",
                signature = self.rule_signature(name),
            ),
        }
    }

    /// Emit the parser expression for one AST node. `default_handler`
    /// marks a handler-less position: bare regexes there are reduced to
    /// their full-match string. The flag flows through choices and
    /// sequences but not through the one-arg operators.
    fn compile_op(&mut self, expr: &Expr, rule_name: &str, default_handler: bool) -> String {
        match &expr.kind {
            ExprKind::Literal(s) => {
                let index = self.interner.literal(s);
                format!("$EXPECT($L{index}, fail, {}, {})", js_string(s), js_string(rule_name))
            }
            ExprKind::Regex(pattern) => {
                let index = self.interner.regex(pattern);
                let atom = format!(
                    "$EXPECT($R{index}, fail, {}, {})",
                    js_string(pattern),
                    js_string(rule_name)
                );
                if default_handler {
                    format!("defaultRegExpTransform({atom})")
                } else {
                    atom
                }
            }
            ExprKind::Choice(items) => {
                format!("$C({})", self.compile_list(items, rule_name, default_handler))
            }
            ExprKind::Sequence(items) => {
                format!("$S({})", self.compile_list(items, rule_name, default_handler))
            }
            ExprKind::ZeroOrMore(item) => {
                format!("$Q({})", self.compile_op(item, rule_name, false))
            }
            ExprKind::OneOrMore(item) => {
                format!("$P({})", self.compile_op(item, rule_name, false))
            }
            ExprKind::Optional(item) => {
                format!("$E({})", self.compile_op(item, rule_name, false))
            }
            ExprKind::Text(item) => {
                format!("$TEXT({})", self.compile_op(item, rule_name, false))
            }
            ExprKind::Lookahead(item) => {
                format!("$Y({})", self.compile_op(item, rule_name, false))
            }
            ExprKind::NotLookahead(item) => {
                format!("$N({})", self.compile_op(item, rule_name, false))
            }
            ExprKind::Ref(name) => name.clone(),
        }
    }

    fn compile_list(&mut self, items: &[Expr], rule_name: &str, default_handler: bool) -> String {
        items
            .iter()
            .map(|item| self.compile_op(item, rule_name, default_handler))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Synthesize the handler wrapper for a node. The parameter shape
    /// follows the operator: sequences bind `$0` (the whole list) plus one
    /// parameter per element, regexes bind `$0..$9` over the match array,
    /// everything else binds the single value as both `$0` and `$1`.
    fn handler_src(&self, kind: &ExprKind, handler: &Handler) -> String {
        match handler {
            Handler::Action(body) => match kind {
                ExprKind::Sequence(items) => format!(
                    "makeResultHandler_S({})",
                    self.action_arrow(items.len() + 1, body)
                ),
                ExprKind::Regex(_) => {
                    format!("makeResultHandler_R({})", self.action_arrow(10, body))
                }
                _ => format!("makeResultHandler({})", self.action_arrow(2, body)),
            },
            Handler::Mapping(mapping) => {
                let (single, offset) = match kind {
                    ExprKind::Sequence(_) => (false, -1),
                    ExprKind::Regex(_) => (false, 0),
                    _ => (true, 0),
                };
                let mapper = structural(mapping, "value", single, offset);
                if self.types {
                    format!("makeStructuralHandler((value: any): any => ({mapper}))")
                } else {
                    format!("makeStructuralHandler((value) => ({mapper}))")
                }
            }
        }
    }

    /// An arrow taking `$loc` plus `$0..$<captures-1>`, annotated when
    /// emitting TypeScript.
    fn action_arrow(&self, captures: usize, body: &str) -> String {
        let mut params = Vec::with_capacity(captures + 1);
        if self.types {
            params.push("$loc: Loc".to_string());
            params.extend((0..captures).map(|i| format!("${i}: any")));
            format!("({}): any => ({body})", params.join(", "))
        } else {
            params.push("$loc".to_string());
            params.extend((0..captures).map(|i| format!("${i}")));
            format!("({}) => ({body})", params.join(", "))
        }
    }

    fn rule_signature(&self, name: &str) -> String {
        if self.types {
            format!("function {name}(state: ParseState): MaybeResult<any>")
        } else {
            format!("function {name}(state)")
        }
    }
}

/// Translate a structural mapping into a target-language expression over
/// `source`. Numbers index with the operator-shape offset (or collapse to
/// the scalar source), strings are literals, arrays construct recursively.
fn structural(mapping: &Mapping, source: &str, single: bool, offset: i64) -> String {
    match mapping {
        Mapping::Str(s) => js_string(s),
        Mapping::Index(n) => {
            if single {
                source.to_string()
            } else {
                format!("{source}[{}]", n + offset)
            }
        }
        Mapping::List(items) => {
            let parts: Vec<String> =
                items.iter().map(|item| structural(item, source, single, offset)).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

/// JSON string encoding doubles as source-text string escaping.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}

fn check_identifier(name: &str) -> Result<(), CompileError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    // Target-language keywords would not parse as function declarations;
    // `parse`/`fail`/`parserState` would redeclare the driver bindings.
    const RESERVED: &[&str] = &[
        "break", "case", "catch", "class", "const", "continue", "default", "delete", "do",
        "else", "export", "extends", "finally", "for", "function", "if", "import", "in",
        "instanceof", "let", "new", "return", "super", "switch", "this", "throw", "try",
        "typeof", "var", "void", "while", "with", "yield",
        "parse", "fail", "parserState",
    ];
    if valid_start && valid_rest && !RESERVED.contains(&name) {
        Ok(())
    } else {
        Err(CompileError::InvalidRuleName { name: name.to_string() })
    }
}

fn check_references(expr: &Expr, grammar: &Grammar) -> Result<(), CompileError> {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Regex(_) => Ok(()),
        ExprKind::Sequence(items) | ExprKind::Choice(items) => {
            items.iter().try_for_each(|item| check_references(item, grammar))
        }
        ExprKind::ZeroOrMore(item)
        | ExprKind::OneOrMore(item)
        | ExprKind::Optional(item)
        | ExprKind::Text(item)
        | ExprKind::Lookahead(item)
        | ExprKind::NotLookahead(item) => check_references(item, grammar),
        ExprKind::Ref(name) => {
            if grammar.get(name).is_some() {
                Ok(())
            } else {
                Err(CompileError::UndefinedRule { name: name.clone() })
            }
        }
    }
}
