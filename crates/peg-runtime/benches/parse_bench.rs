//! Throughput of direct grammar evaluation.

#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use peg_ast::Grammar;
use peg_runtime::Parser;
use serde_json::json;

fn word_list_grammar() -> Grammar {
    let doc = json!({
        "Start": ["S", ["Word", ["*", ["S", [["L", ","], "Word"]]]]],
        "Word": ["$", ["R", "[a-z]+"]],
    });
    Grammar::from_json(&doc).unwrap()
}

fn bench_word_list(c: &mut Criterion) {
    let grammar = word_list_grammar();
    let mut parser = Parser::new(&grammar).unwrap();
    let input = vec!["lorem"; 512].join(",");

    c.bench_function("parse_word_list_512", |b| {
        b.iter(|| parser.parse(black_box(&input)).unwrap())
    });
}

criterion_group!(benches, bench_word_list);
criterion_main!(benches);
