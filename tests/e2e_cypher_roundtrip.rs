//! Exercises the kept `cypher` lexer/parser as a round-trip check on the
//! compiler's rendered Cypher text (§4.5): parse what Phase G produced and
//! assert on the parsed AST's shape instead of matching the text itself,
//! since exact punctuation/whitespace in generated text is not something
//! worth pinning down in a test.

mod common;

use common::{register_fixtures, Person};
use graph_ogm::cypher;
use graph_ogm::query::op::{Operation, Program};
use graph_ogm::{compiler, field, NodeType};

#[test]
fn rendered_match_where_query_parses_back_into_a_single_match_statement() {
    register_fixtures();

    let program = Program(vec![
        Operation::RootNodes { labels: vec!["Person"], schema: Person::schema() },
        Operation::Where(field("age").gt(30)),
        Operation::OrderBy { field: "name".into(), desc: false },
        Operation::Take(10),
    ]);

    let compiled = compiler::compile(&program).unwrap();
    assert!(!compiled.text.is_empty());

    let statement = cypher::parse(&compiled.text).expect("compiler output must be valid Cypher");
    match statement {
        cypher::ast::Statement::Query(query) => {
            assert!(!query.matches.is_empty(), "a compiled read query renders at least one MATCH clause");
            assert!(query.where_clause.is_some());
            assert!(query.limit.is_some());
        }
        other => panic!("expected a query statement, got {other:?}"),
    }
}

#[test]
fn rendered_aggregate_query_also_round_trips_through_the_parser() {
    register_fixtures();

    let program = Program(vec![
        Operation::RootNodes { labels: vec!["Person"], schema: Person::schema() },
        Operation::GroupBy { field: "city".into() },
        Operation::Aggregate { kind: graph_ogm::AggKind::Avg, field: Some("age".into()) },
    ]);

    let compiled = compiler::compile(&program).unwrap();
    let statement = cypher::parse(&compiled.text).expect("compiler output must be valid Cypher");
    assert!(matches!(statement, cypher::ast::Statement::Query(_)));
}
