//! Planning-level properties: validation, merge collisions, idempotence.

use std::collections::HashSet;

use dynoscan_core::{
    PlanError, QueryConfig, ScanConfig, build_query_spec, build_scan_spec, plan_segments,
};

use crate::init_tracing;

#[test]
fn test_should_cover_every_segment_exactly_once() {
    init_tracing();
    for total in [1, 2, 7, 64] {
        let config = ScanConfig::builder()
            .table_name("orders".to_owned())
            .total_segments(total)
            .build();
        let specs = plan_segments(&config).unwrap();
        assert_eq!(specs.len() as u32, total);
        let indices: HashSet<u32> = specs.iter().map(|s| s.segment).collect();
        assert_eq!(indices, (0..total).collect());
    }
}

#[test]
fn test_should_reject_invalid_configs_before_any_io() {
    init_tracing();
    let bad_segment = ScanConfig::builder()
        .table_name("orders".to_owned())
        .segment(3)
        .total_segments(2)
        .build();
    assert!(matches!(
        build_scan_spec(&bad_segment),
        Err(PlanError::Configuration(_))
    ));

    let bad_page_size = QueryConfig::builder()
        .table_name("orders".to_owned())
        .page_size(0)
        .build();
    assert!(matches!(
        build_query_spec(&bad_page_size),
        Err(PlanError::Configuration(_))
    ));
}

#[test]
fn test_should_reject_colliding_placeholder_maps() {
    init_tracing();
    // Projection and filter each start a fresh allocator; both emit #0,
    // bound to different attributes.
    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .required_columns(Some(vec!["id".to_owned(), "name".to_owned()]))
        .filter_expression(Some("status = 'active'".to_owned()))
        .build();
    assert!(matches!(
        build_scan_spec(&config),
        Err(PlanError::PlaceholderCollision { .. })
    ));
}

#[test]
fn test_should_fail_whole_build_on_syntax_error() {
    init_tracing();
    let config = QueryConfig::builder()
        .table_name("orders".to_owned())
        .key_expression(Some("pk = 'k1'".to_owned()))
        .filter_expression(Some("status IN ('a',".to_owned()))
        .build();
    assert!(matches!(
        build_query_spec(&config),
        Err(PlanError::Syntax(_))
    ));
}

#[test]
fn test_should_serialize_request_in_wire_shape() {
    init_tracing();
    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .segment(2)
        .total_segments(4)
        .page_size(100)
        .required_columns(Some(vec!["id".to_owned(), "name".to_owned()]))
        .build();
    let spec = build_scan_spec(&config).unwrap();
    let request = spec.to_request(std::collections::HashMap::new());

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["TableName"], "orders");
    assert_eq!(json["Segment"], 2);
    assert_eq!(json["TotalSegments"], 4);
    assert_eq!(json["Limit"], 100);
    assert_eq!(json["ReturnConsumedCapacity"], "TOTAL");
    assert_eq!(json["ProjectionExpression"], "#0, #1");
    assert_eq!(json["ExpressionAttributeNames"]["#0"], "id");
    assert_eq!(json["ExpressionAttributeNames"]["#1"], "name");
    assert!(json.get("ExpressionAttributeValues").is_none());
    assert!(json.get("FilterExpression").is_none());
}

#[test]
fn test_should_build_semantically_identical_specs_across_calls() {
    init_tracing();
    let config = ScanConfig::builder()
        .table_name("orders".to_owned())
        .filter_expression(Some("status = 'active' AND total > 100".to_owned()))
        .required_columns(Some(vec![
            "status".to_owned(),
            "total".to_owned(),
            "pk".to_owned(),
        ]))
        .build();

    let first = build_scan_spec(&config).unwrap();
    let second = build_scan_spec(&config).unwrap();

    // Compare by substitution semantics, not by symbol strings.
    let resolve = |text: &str, spec: &dynoscan_core::ScanSpec| {
        let mut resolved = text.to_owned();
        for (symbol, name) in &spec.expression_attribute_names {
            resolved = resolved.replace(symbol, name);
        }
        for (symbol, value) in &spec.expression_attribute_values {
            resolved = resolved.replace(symbol, &format!("{value:?}"));
        }
        resolved
    };

    assert_eq!(
        resolve(first.filter_expression.as_deref().unwrap(), &first),
        resolve(second.filter_expression.as_deref().unwrap(), &second)
    );
    assert_eq!(
        resolve(first.projection_expression.as_deref().unwrap(), &first),
        resolve(second.projection_expression.as_deref().unwrap(), &second)
    );
}
