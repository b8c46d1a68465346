//! Graph traversal (§4.4 `Traverse`/`ThenTraverse`/`PathSegments`) and
//! dotted-path predicates over a nested complex property.

mod common;

use common::{register_fixtures, Address, Company, Knows, Person, WorksAt};
use graph_ogm::{field, ErasedNode, Store, TraverseDirection};

async fn seed(graph: &graph_ogm::Graph) {
    graph
        .create_node(
            None,
            &Person {
                id: "alice".into(),
                name: "Alice".into(),
                age: 29,
                city: "Portland".into(),
                tags: vec![],
                home: Address { street: "1 Main St".into(), city: "Portland".into() },
            },
        )
        .await
        .unwrap();
    graph.create_node(None, &Person { id: "bob".into(), name: "Bob".into(), age: 41, ..Default::default() }).await.unwrap();
    graph.create_node(None, &Company { id: "acme".into(), name: "Acme".into() }).await.unwrap();

    graph
        .create_relationship(None, &WorksAt { id: "r1".into(), start_id: "alice".into(), end_id: "acme".into(), since: 2019 })
        .await
        .unwrap();
    graph
        .create_relationship(None, &Knows { id: "r2".into(), start_id: "alice".into(), end_id: "bob".into(), closeness: 8 })
        .await
        .unwrap();
}

#[tokio::test]
async fn traverse_one_hop_to_target_nodes() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let companies =
        graph.nodes::<Person>().where_clause(field("id").eq("alice")).traverse::<WorksAt, Company>().to().await.unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].name, "Acme");
}

#[tokio::test]
async fn traverse_relationships_terminal_returns_crossed_edges() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let edges = graph
        .nodes::<Person>()
        .where_clause(field("id").eq("alice"))
        .traverse::<Knows, Person>()
        .relationships()
        .await
        .unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].closeness, 8);
}

#[tokio::test]
async fn path_segments_carry_start_rel_and_end() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let segments = graph
        .nodes::<Person>()
        .where_clause(field("id").eq("alice"))
        .traverse::<Knows, Person>()
        .path_segments()
        .to_list()
        .await
        .unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start.id, "alice");
    assert_eq!(segments[0].rel.closeness, 8);
    assert_eq!(segments[0].end.id, "bob");
}

#[tokio::test]
async fn traverse_direction_can_be_reversed() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let back_to_alice = graph
        .nodes::<Person>()
        .where_clause(field("id").eq("bob"))
        .traverse::<Knows, Person>()
        .direction(TraverseDirection::Incoming)
        .to()
        .await
        .unwrap();
    assert_eq!(back_to_alice.len(), 1);
    assert_eq!(back_to_alice[0].id, "alice");
}

#[tokio::test]
async fn dotted_predicate_filters_on_a_nested_complex_property() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let matches = graph.nodes::<Person>().where_clause(field("home.city").eq("Portland")).to_list().await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].node_id(), "alice");

    let none = graph.nodes::<Person>().where_clause(field("home.city").eq("Seattle")).to_list().await.unwrap();
    assert!(none.is_empty());
}
