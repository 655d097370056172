//! Key-addressed queries against the in-memory store.

use dynoscan_core::{QueryConfig, build_query_spec, read_query};
use dynoscan_model::AttributeValue;

use crate::{MemoryStore, init_tracing, order_item, order_table};

#[tokio::test]
async fn test_should_query_by_key_condition() {
    init_tracing();
    let store = MemoryStore::new(order_table(40));

    let config = QueryConfig::builder()
        .table_name("orders".to_owned())
        .key_expression(Some("pk = 'order#0007'".to_owned()))
        .build();
    let spec = build_query_spec(&config).unwrap();

    let items = read_query(&store, spec).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].get("pk"),
        Some(&AttributeValue::S("order#0007".to_owned()))
    );
}

#[tokio::test]
async fn test_should_paginate_query_with_filter() {
    init_tracing();
    // Many items under one logical key, filtered by status.
    let items: Vec<_> = (0..25)
        .map(|i| {
            let mut item = order_item(&format!("order#{i:04}"), "open", i);
            item.insert("bucket".to_owned(), AttributeValue::S("b1".to_owned()));
            item
        })
        .collect();
    let store = MemoryStore::new(items);

    let config = QueryConfig::builder()
        .table_name("orders".to_owned())
        .key_expression(Some("bucket = 'b1'".to_owned()))
        .filter_expression(Some("bucket = 'b1'".to_owned()))
        .page_size(10)
        .build();
    let spec = build_query_spec(&config).unwrap();

    let items = read_query(&store, spec).await.unwrap();
    assert_eq!(items.len(), 25);
    assert_eq!(store.pages_served(), 3);
}

#[tokio::test]
async fn test_should_respect_descending_traversal() {
    init_tracing();
    let items: Vec<_> = (0..6)
        .map(|i| {
            let mut item = order_item(&format!("order#{i:04}"), "open", i);
            item.insert("bucket".to_owned(), AttributeValue::S("b1".to_owned()));
            item
        })
        .collect();
    let store = MemoryStore::new(items);

    let config = QueryConfig::builder()
        .table_name("orders".to_owned())
        .key_expression(Some("bucket = 'b1'".to_owned()))
        .ascending(Some(false))
        .page_size(4)
        .build();
    let spec = build_query_spec(&config).unwrap();

    let items = read_query(&store, spec).await.unwrap();
    let keys: Vec<&str> = items
        .iter()
        .map(|item| item.get("pk").and_then(AttributeValue::as_s).unwrap())
        .collect();
    let mut expected: Vec<String> = (0..6).map(|i| format!("order#{i:04}")).collect();
    expected.reverse();
    assert_eq!(keys, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_should_project_query_results() {
    init_tracing();
    let store = MemoryStore::new(order_table(12));

    let config = QueryConfig::builder()
        .table_name("orders".to_owned())
        .key_expression(Some("pk = 'order#0003'".to_owned()))
        .required_columns(Some(vec!["pk".to_owned(), "total".to_owned()]))
        .build();
    let spec = build_query_spec(&config).unwrap();

    let items = read_query(&store, spec).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].len(), 2);
    assert!(items[0].contains_key("pk"));
    assert!(items[0].contains_key("total"));
}
