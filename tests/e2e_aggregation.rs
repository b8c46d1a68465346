//! Projection, grouping/aggregation, ordering/pagination, and full-text
//! search (§4.4 Phase D/E, `search`).

mod common;

use common::{register_fixtures, Address, Person};
use graph_ogm::{field, AggKind, ErasedNode, Store, Value};

async fn seed(graph: &graph_ogm::Graph) {
    let people = [
        ("p1", "Alice", 29, "Portland"),
        ("p2", "Bob", 41, "Portland"),
        ("p3", "Cora", 35, "Seattle"),
        ("p4", "Dave", 22, "Seattle"),
    ];
    for (id, name, age, city) in people {
        graph
            .create_node(
                None,
                &Person {
                    id: id.into(),
                    name: name.into(),
                    age,
                    city: city.into(),
                    tags: vec![],
                    home: Address { street: "".into(), city: city.into() },
                },
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn order_by_skip_and_take_paginate_results() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let page = graph.nodes::<Person>().order_by("age", false).skip(1).take(2).to_list().await.unwrap();
    let names: Vec<_> =
        page.iter().map(|n| n.as_any().downcast_ref::<Person>().unwrap().name.clone()).collect();
    assert_eq!(names, vec!["Alice", "Cora"]);
}

#[tokio::test]
async fn count_reports_the_matching_row_count() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let n = graph.nodes::<Person>().where_clause(field("home.city").eq("Portland")).count().await.unwrap();
    assert_eq!(n, 2);
}

#[tokio::test]
async fn select_projects_a_subset_of_fields() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let rows = graph.nodes::<Person>().order_by("name", false).select(["name", "age"]).to_list().await.unwrap();
    assert_eq!(rows.len(), 4);
    let first: std::collections::HashMap<_, _> = rows[0].iter().cloned().collect();
    assert_eq!(first.get("name"), Some(&Value::String("Alice".into())));
}

#[tokio::test]
async fn group_by_city_aggregates_average_age() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let mut groups = graph.nodes::<Person>().group_by("city").aggregate(AggKind::Avg, Some("age")).to_list().await.unwrap();
    groups.sort_by(|a, b| a.0.to_string().cmp(&b.0.to_string()));

    assert_eq!(groups.len(), 2);
    let (portland_key, portland_avg) = &groups[0];
    assert_eq!(portland_key, &Value::String("Portland".into()));
    assert_eq!(portland_avg.as_float(), Some(35.0));
}

#[tokio::test]
async fn search_matches_a_case_insensitive_substring() {
    register_fixtures();
    let store = Store::open_memory();
    let graph = store.graph();
    seed(graph).await;

    let hits = graph.nodes::<Person>().search("cor", ["name"]).to_list().await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Cora");
}
