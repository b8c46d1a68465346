//! Polymorphic reads (§3, §8 scenario S3), cooperative cancellation, and
//! `distinct()`.

mod common;

use std::sync::Arc;

use common::{register_fixtures, Manager, Person};
use graph_ogm::{CancellationToken, Driver, ExecutionContext, MemoryDriver, NodeQuery, Store};

#[tokio::test]
async fn nodes_query_resolves_each_row_to_its_own_most_derived_type() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph.create_node(None, &Person { id: "p1".into(), name: "Plain".into(), ..Default::default() }).await.unwrap();
    graph
        .create_node(None, &Manager { id: "m1".into(), name: "Manager One".into(), team_size: 5 })
        .await
        .unwrap();

    // ============================================================
    // 1. The root pattern for `nodes::<Person>()` matches both labels
    //    (`Registry::compatible_labels`), so the subtype's row comes
    //    back too ...
    // ============================================================
    let mut all = graph.nodes::<Person>().to_list().await.unwrap();
    all.sort_by(|a, b| a.node_id().cmp(&b.node_id()));
    assert_eq!(all.len(), 2);

    // ============================================================
    // 2. ... and each row resolves `most_derived(Person, row.label)`:
    //    the manager row comes back as a `Manager`, not a `Person`
    //    missing its `team_size`.
    // ============================================================
    assert_eq!(all[0].type_name(), "Manager");
    let manager = all[0].as_any().downcast_ref::<Manager>().unwrap();
    assert_eq!(manager.team_size, 5);
    assert_eq!(all[1].type_name(), "Person");
}

#[tokio::test]
async fn get_node_resolves_the_most_derived_registered_subtype() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph
        .create_node(None, &Manager { id: "m2".into(), name: "Manager Two".into(), team_size: 9 })
        .await
        .unwrap();

    let erased = graph.get_node::<Person>(None, "m2").await.unwrap();
    assert_eq!(erased.type_name(), "Manager");
    let manager = erased.as_any().downcast_ref::<Manager>().unwrap();
    assert_eq!(manager.team_size, 9);
}

#[tokio::test]
async fn dynamic_nodes_resolves_each_row_by_its_own_label() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph.create_node(None, &Person { id: "p2".into(), name: "Plain Two".into(), ..Default::default() }).await.unwrap();
    graph
        .create_node(None, &Manager { id: "m3".into(), name: "Manager Three".into(), team_size: 2 })
        .await
        .unwrap();

    let mut rows = graph.dynamic_nodes("Manager").to_list().await.unwrap();
    assert_eq!(rows.len(), 1);
    let only = rows.remove(0);
    assert_eq!(only.type_name(), "Manager");
}

#[tokio::test]
async fn a_pre_cancelled_token_stops_a_query_before_it_runs() {
    register_fixtures();
    let driver: Arc<dyn Driver> = MemoryDriver::shared();
    let token = CancellationToken::new();
    token.cancel();

    let ctx = ExecutionContext::new(driver).with_cancellation(token);
    let err = NodeQuery::<Person>::new(ctx).to_list().await.unwrap_err();
    assert_eq!(err.kind(), graph_ogm::ErrorKind::Cancelled);
}

#[tokio::test]
async fn distinct_deduplicates_rows_by_id() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph.create_node(None, &Person { id: "p3".into(), name: "Same".into(), ..Default::default() }).await.unwrap();

    let rows = graph.nodes::<Person>().distinct().to_list().await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn to_stream_yields_rows_one_page_at_a_time() {
    use futures_util::StreamExt;

    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph.create_node(None, &Person { id: "p4".into(), name: "A".into(), ..Default::default() }).await.unwrap();
    graph.create_node(None, &Person { id: "p5".into(), name: "B".into(), ..Default::default() }).await.unwrap();

    let mut stream = Box::pin(graph.nodes::<Person>().to_stream().await.unwrap());
    let mut ids = Vec::new();
    while let Some(row) = stream.next().await {
        ids.push(row.unwrap().node_id());
    }
    ids.sort();
    assert_eq!(ids, vec!["p4".to_string(), "p5".to_string()]);
}

#[tokio::test]
async fn to_set_deduplicates_and_to_dictionary_keys_by_property() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph.create_node(None, &Person { id: "p6".into(), name: "Dup".into(), ..Default::default() }).await.unwrap();

    let set = graph.nodes::<Person>().distinct().to_set().await.unwrap();
    assert_eq!(set.len(), 1);

    let dict = graph.nodes::<Person>().to_dictionary("id").await.unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict[0].1.type_name(), "Person");
}

#[tokio::test]
async fn element_at_in_range_returns_the_row_either_way() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph.create_node(None, &Person { id: "p7".into(), name: "Only".into(), ..Default::default() }).await.unwrap();

    let row = graph.nodes::<Person>().element_at(0, false).await.unwrap();
    assert_eq!(row.unwrap().node_id(), "p7");
    let row = graph.nodes::<Person>().element_at(0, true).await.unwrap();
    assert_eq!(row.unwrap().node_id(), "p7");
}

#[tokio::test]
async fn element_at_out_of_range_errors_unless_or_default() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();

    graph.create_node(None, &Person { id: "p8".into(), name: "Only".into(), ..Default::default() }).await.unwrap();

    let err = graph.nodes::<Person>().element_at(5, false).await.unwrap_err();
    assert_eq!(err.kind(), graph_ogm::ErrorKind::NotFound);

    let row = graph.nodes::<Person>().element_at(5, true).await.unwrap();
    assert!(row.is_none());
}

