//! Grammar-level behavior: evaluation semantics, handler application, and
//! diagnostic formatting.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use peg_ast::Grammar;
use peg_runtime::{ParseError, ParseOptions, Parser};
use serde_json::{Value as Json, json};

fn grammar(doc: Json) -> Grammar {
    Grammar::from_json(&doc).unwrap()
}

fn parse(doc: Json, input: &str) -> Result<Json, ParseError> {
    let grammar = grammar(doc);
    let mut parser = Parser::new(&grammar).unwrap();
    parser.parse(input).map(|v| serde_json::to_value(&v).unwrap())
}

#[test]
fn repetition_collects_literals() {
    let doc = json!({ "Start": ["*", ["L", "a"]] });
    assert_eq!(parse(doc, "aaa").unwrap(), json!(["a", "a", "a"]));
}

#[test]
fn ordered_choice_takes_the_first_match() {
    let doc = json!({ "Start": ["/", [["L", "a"], ["L", "b"]]] });
    assert_eq!(parse(doc.clone(), "b").unwrap(), json!("b"));

    let err = parse(doc, "c").unwrap_err();
    assert_eq!(
        err.to_string(),
        "input:1:1 Failed to parse\nExpected:\n    \"a\"\n    \"b\"\nFound: \"c\""
    );
}

#[test]
fn text_capture_of_a_regex_yields_a_string() {
    let doc = json!({ "Start": ["$", ["R", "[a-z]+"]] });
    assert_eq!(parse(doc, "hello").unwrap(), json!("hello"));
}

#[test]
fn structural_reordering_uses_one_based_sequence_offsets() {
    let doc = json!({ "Start": ["S", [["L", "a"], ["L", "b"]], [2, 1]] });
    assert_eq!(parse(doc, "ab").unwrap(), json!(["b", "a"]));
}

#[test]
fn failure_reports_the_rightmost_position() {
    let doc = json!({ "Start": ["S", [["L", "a"], ["L", "b"], ["L", "c"]]] });
    let grammar = grammar(doc);
    let mut parser = Parser::new(&grammar).unwrap();
    let err = parser
        .parse_with("abd", &ParseOptions { filename: Some("test.peg".into()) })
        .unwrap_err();

    assert_eq!(parser.failures().max_fail_pos(), 2);
    assert_eq!(
        err.to_string(),
        "test.peg:1:3 Failed to parse\nExpected:\n    \"c\"\nFound: \"d\""
    );
}

#[test]
fn lookahead_does_not_consume() {
    let doc = json!({ "Start": ["S", [["&", ["L", "a"]], ["L", "a"]]] });
    assert_eq!(parse(doc, "a").unwrap(), json!([null, "a"]));
}

#[test]
fn empty_input_against_a_nullable_start_rule() {
    let doc = json!({ "Start": ["*", ["L", "a"]] });
    assert_eq!(parse(doc, "").unwrap(), json!([]));
}

#[test]
fn empty_input_against_a_consuming_rule_reports_eof() {
    let doc = json!({ "Start": ["L", "a"] });
    let err = parse(doc, "").unwrap_err();
    assert_eq!(
        err.to_string(),
        "input:1:1 Failed to parse\nExpected:\n    \"a\"\nFound: EOF"
    );
}

#[test]
fn unconsumed_input_is_its_own_diagnostic() {
    let doc = json!({ "Start": ["L", "a"] });
    let err = parse(doc, "ab").unwrap_err();
    assert!(matches!(err, ParseError::Unconsumed { .. }));
    assert_eq!(err.to_string(), "input:1:2 Unconsumed input at 1:2\n\nb");
}

#[test]
fn diagnostics_count_newline_variants() {
    let doc = json!({ "Start": ["S", [["L", "a\nb\r\nc"], ["L", "x"]]] });
    let err = parse(doc, "a\nb\r\nc!").unwrap_err();
    assert_eq!(
        err.to_string(),
        "input:3:2 Failed to parse\nExpected:\n    \"x\"\nFound: \"!\""
    );
}

#[test]
fn regex_expectations_render_slashed_and_deduplicated() {
    let doc = json!({ "Start": ["/", [["R", "[0-9]+"], ["R", "[0-9]+"], ["L", "x"]]] });
    let err = parse(doc, "q").unwrap_err();
    assert_eq!(
        err.to_string(),
        "input:1:1 Failed to parse\nExpected:\n    /[0-9]+/\n    \"x\"\nFound: \"q\""
    );
}

#[test]
fn rejected_regex_alternative_recovers() {
    let doc = json!({ "Start": ["/", [["R", "[0-9]+"], ["L", "x"]]] });
    assert_eq!(parse(doc, "x").unwrap(), json!("x"));
}

#[test]
fn bare_regex_reduces_to_the_full_match() {
    let doc = json!({ "Start": ["R", "(a)(b)?[a-z]*"] });
    assert_eq!(parse(doc, "axyz").unwrap(), json!("axyz"));
}

#[test]
fn repetition_over_a_bare_regex_keeps_match_arrays() {
    // The default regex-to-string transform does not flow through the
    // repetition operators; each element stays a match array.
    let doc = json!({ "Start": ["*", ["R", "[a-z]"]] });
    assert_eq!(parse(doc, "ab").unwrap(), json!([["a"], ["b"]]));
}

#[test]
fn structural_mapping_on_a_regex_is_zero_based() {
    let doc = json!({ "Start": ["R", "(a)(b)", 1] });
    assert_eq!(parse(doc, "ab").unwrap(), json!("a"));
}

#[test]
fn structural_string_mappings_are_literal() {
    let doc = json!({ "Start": ["S", [["L", "a"]], ["tagged", 1]] });
    assert_eq!(parse(doc, "a").unwrap(), json!(["tagged", "a"]));
}

#[test]
fn scalar_numeric_mapping_collapses_to_the_value() {
    let doc = json!({ "Start": ["$", ["R", "[a-z]+"], 3] });
    assert_eq!(parse(doc, "word").unwrap(), json!("word"));
}

#[test]
fn rules_late_bind_and_recurse() {
    let doc = json!({
        "Start": ["/", [["S", ["Item", "Start"]], ["L", "b"]]],
        "Item": ["L", "a"],
    });
    assert_eq!(parse(doc, "aab").unwrap(), json!(["a", ["a", "b"]]));
}

#[test]
fn choice_alternatives_carry_their_own_handlers() {
    let doc = json!({
        "Start": ["/", [
            ["S", [["L", "a"], ["L", "b"]], [2]],
            ["R", "[0-9]+"],
        ]],
    });
    assert_eq!(parse(doc.clone(), "ab").unwrap(), json!(["b"]));
    // The handler-less alternative still gets the default regex transform.
    assert_eq!(parse(doc, "42").unwrap(), json!("42"));
}

#[test]
fn functional_handlers_pass_through_in_direct_evaluation() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let doc = json!({ "Start": ["S", [["L", "a"]], { "f": "$1.toUpperCase()" }] });
    assert_eq!(parse(doc, "a").unwrap(), json!(["a"]));
}

#[test]
fn optional_produces_an_absent_value() {
    let doc = json!({ "Start": ["S", [["?", ["L", "a"]], ["L", "b"]]] });
    assert_eq!(parse(doc.clone(), "b").unwrap(), json!([null, "b"]));
    assert_eq!(parse(doc, "ab").unwrap(), json!(["a", "b"]));
}

#[test]
fn negative_lookahead_guards_alternatives() {
    // Keyword rule: a word that is not "end".
    let doc = json!({
        "Start": ["+", "Word"],
        "Word": ["S", [["!", ["L", "end"]], ["$", ["R", "[a-z]+ ?"]]], [2]],
    });
    assert_eq!(parse(doc.clone(), "foo bar").unwrap(), json!([["foo "], ["bar"]]));
    let err = parse(doc, "end").unwrap_err();
    assert!(matches!(err, ParseError::Failed { .. }));
}

#[test]
fn whitespace_hint_is_quoted() {
    let doc = json!({ "Start": ["L", "a"] });
    let err = parse(doc, "   ").unwrap_err();
    assert_eq!(
        err.to_string(),
        "input:1:1 Failed to parse\nExpected:\n    \"a\"\nFound: \"   \""
    );
}
