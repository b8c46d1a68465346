//! Basic node CRUD, including the complex-property (`home`) and
//! simple-collection (`tags`) round trip.

mod common;

use common::{register_fixtures, Address, Person};
use graph_ogm::{ErasedNode, Store};

#[tokio::test]
async fn create_and_get_round_trips_simple_and_complex_properties() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    // ============================================================
    // 1. Create a node with a nested complex property and a simple
    //    collection.
    // ============================================================
    let ada = Person {
        id: "p1".into(),
        name: "Ada".into(),
        age: 36,
        city: "London".into(),
        tags: vec!["engineer".into(), "historian".into()],
        home: Address { street: "1 Babbage Way".into(), city: "London".into() },
    };
    graph.create_node(None, &ada).await.unwrap();

    // ============================================================
    // 2. Read it back and confirm every field round-tripped.
    // ============================================================
    let back = graph.get_node::<Person>(None, "p1").await.unwrap();
    assert_eq!(back.as_any().downcast_ref::<Person>(), Some(&ada));

    // ============================================================
    // 3. The untyped read sees the same data at the wire level.
    // ============================================================
    let raw = graph.get_dynamic_node(None, "p1").await.unwrap();
    assert!(raw.has_label("Person"));
    assert_eq!(raw.get("name"), Some(&graph_ogm::Value::String("Ada".into())));
}

#[tokio::test]
async fn update_node_replaces_properties_and_complex_subgraph() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    let mut ada = Person {
        id: "p2".into(),
        name: "Ada".into(),
        age: 30,
        city: "London".into(),
        tags: vec!["engineer".into()],
        home: Address::default(),
    };
    graph.create_node(None, &ada).await.unwrap();

    ada.age = 31;
    ada.tags = vec!["engineer".into(), "mathematician".into()];
    ada.home = Address { street: "2 Analytical Engine Rd".into(), city: "Manchester".into() };
    graph.update_node(None, &ada).await.unwrap();

    let back = graph.get_node::<Person>(None, "p2").await.unwrap();
    assert_eq!(back.as_any().downcast_ref::<Person>(), Some(&ada));
}

#[tokio::test]
async fn get_node_on_missing_id_is_not_found() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    let err = graph.get_node::<Person>(None, "nope").await.unwrap_err();
    assert_eq!(err.kind(), graph_ogm::ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_node_without_relationships_succeeds_either_way() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    let p = Person { id: "p3".into(), name: "Grace".into(), ..Default::default() };
    graph.create_node(None, &p).await.unwrap();

    assert!(graph.delete_node(None, "p3", false).await.unwrap());
    assert!(graph.get_node::<Person>(None, "p3").await.is_err());
}
