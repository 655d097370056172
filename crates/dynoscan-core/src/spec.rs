//! Compiled scan and query specs.
//!
//! A spec is the immutable, store-ready form of one config: compiled
//! expression text, merged substitution maps, and the pagination and
//! capacity fields. Projection and filter (and, for queries, key
//! condition) are compiled with independent allocators, then their maps
//! are unioned. Because each allocator numbers from zero, both sides can
//! legitimately emit the same symbol; the union keeps one-sided entries
//! and rejects any symbol bound to two different values.

use std::collections::HashMap;

use tracing::debug;

use dynoscan_model::types::ReturnConsumedCapacity;
use dynoscan_model::{AttributeValue, QueryRequest, ScanRequest};

use crate::config::{QueryConfig, ScanConfig};
use crate::error::{PlanError, PlanResult};
use crate::expression::{CompiledExpression, compile_predicate, compile_projection};

/// Store-ready description of one scan segment's page requests.
///
/// Owned exclusively by the worker driving that segment; sibling segments
/// get their own copies.
#[derive(Debug, Clone)]
pub struct ScanSpec {
    /// Table to scan.
    pub table_name: String,
    /// Secondary index, if any.
    pub index_name: Option<String>,
    /// Segment this spec is fixed at.
    pub segment: u32,
    /// Total number of parallel segments.
    pub total_segments: u32,
    /// Maximum items evaluated per page.
    pub max_page_size: u32,
    /// Compiled projection text, placeholders only.
    pub projection_expression: Option<String>,
    /// Compiled filter text, placeholders only.
    pub filter_expression: Option<String>,
    /// Merged name placeholder map.
    pub expression_attribute_names: HashMap<String, String>,
    /// Merged value placeholder map.
    pub expression_attribute_values: HashMap<String, AttributeValue>,
    /// Strongly consistent reads.
    pub consistent_read: Option<bool>,
    /// Read units per second, threaded through for the execution layer.
    pub rate_limit: Option<u32>,
    /// Capacity reporting mode, always `TOTAL`.
    pub return_consumed_capacity: ReturnConsumedCapacity,
}

impl ScanSpec {
    /// Render one page request from this spec and the segment's current
    /// continuation token (empty on the first page).
    ///
    /// The spec itself never changes, so the request is pure and safely
    /// re-submittable.
    #[must_use]
    pub fn to_request(&self, exclusive_start_key: HashMap<String, AttributeValue>) -> ScanRequest {
        // A single-segment scan goes on the wire as a plain scan.
        let parallel = self.total_segments > 1;
        ScanRequest {
            table_name: self.table_name.clone(),
            index_name: self.index_name.clone(),
            filter_expression: self.filter_expression.clone(),
            projection_expression: self.projection_expression.clone(),
            expression_attribute_names: self.expression_attribute_names.clone(),
            expression_attribute_values: self.expression_attribute_values.clone(),
            limit: Some(i32::try_from(self.max_page_size).unwrap_or(i32::MAX)),
            exclusive_start_key,
            segment: parallel.then(|| i32::try_from(self.segment).unwrap_or(i32::MAX)),
            total_segments: parallel.then(|| i32::try_from(self.total_segments).unwrap_or(i32::MAX)),
            consistent_read: self.consistent_read,
            return_consumed_capacity: Some(self.return_consumed_capacity.clone()),
        }
    }
}

/// Store-ready description of one query's page requests.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Table to query.
    pub table_name: String,
    /// Secondary index, if any.
    pub index_name: Option<String>,
    /// Maximum items evaluated per page.
    pub max_page_size: u32,
    /// Compiled projection text, placeholders only.
    pub projection_expression: Option<String>,
    /// Compiled key-condition text, placeholders only.
    pub key_condition_expression: Option<String>,
    /// Compiled filter text, placeholders only.
    pub filter_expression: Option<String>,
    /// Merged name placeholder map.
    pub expression_attribute_names: HashMap<String, String>,
    /// Merged value placeholder map.
    pub expression_attribute_values: HashMap<String, AttributeValue>,
    /// Strongly consistent reads.
    pub consistent_read: Option<bool>,
    /// Sort-key traversal order.
    pub ascending: Option<bool>,
    /// Read units per second, threaded through for the execution layer.
    pub rate_limit: Option<u32>,
    /// Capacity reporting mode, always `TOTAL`.
    pub return_consumed_capacity: ReturnConsumedCapacity,
}

impl QuerySpec {
    /// Render one page request from this spec and the current continuation
    /// token (empty on the first page).
    #[must_use]
    pub fn to_request(&self, exclusive_start_key: HashMap<String, AttributeValue>) -> QueryRequest {
        QueryRequest {
            table_name: self.table_name.clone(),
            index_name: self.index_name.clone(),
            key_condition_expression: self.key_condition_expression.clone(),
            filter_expression: self.filter_expression.clone(),
            projection_expression: self.projection_expression.clone(),
            expression_attribute_names: self.expression_attribute_names.clone(),
            expression_attribute_values: self.expression_attribute_values.clone(),
            scan_index_forward: self.ascending,
            limit: Some(i32::try_from(self.max_page_size).unwrap_or(i32::MAX)),
            exclusive_start_key,
            consistent_read: self.consistent_read,
            return_consumed_capacity: Some(self.return_consumed_capacity.clone()),
        }
    }
}

/// Build the spec for the one segment a scan config addresses.
///
/// # Errors
///
/// Returns [`PlanError`] if the config fails validation, an expression
/// fails to parse, or the placeholder-map union hits a collision.
pub fn build_scan_spec(config: &ScanConfig) -> PlanResult<ScanSpec> {
    config.validate()?;

    let mut merged = MergedContext::default();
    let projection = config
        .required_columns
        .as_deref()
        .map(|columns| merged.absorb(compile_projection(columns)))
        .transpose()?;
    let filter = config
        .filter_expression
        .as_deref()
        .map(|text| compile_predicate(text).map_err(PlanError::from))
        .transpose()?
        .map(|compiled| merged.absorb(compiled))
        .transpose()?;

    debug!(
        table = %config.table_name,
        segment = config.segment,
        total_segments = config.total_segments,
        names = merged.names.len(),
        values = merged.values.len(),
        "built scan spec"
    );

    Ok(ScanSpec {
        table_name: config.table_name.clone(),
        index_name: config.index_name.clone(),
        segment: config.segment,
        total_segments: config.total_segments,
        max_page_size: config.page_size,
        projection_expression: projection,
        filter_expression: filter,
        expression_attribute_names: merged.names,
        expression_attribute_values: merged.values,
        consistent_read: config.consistent_read,
        rate_limit: config.rate_limit,
        return_consumed_capacity: ReturnConsumedCapacity::Total,
    })
}

/// Build the spec for a query config.
///
/// Projection, key condition, and filter are each compiled with a fresh
/// allocator and merged pairwise under the same union policy.
///
/// # Errors
///
/// Returns [`PlanError`] if the config fails validation, an expression
/// fails to parse, or the placeholder-map union hits a collision.
pub fn build_query_spec(config: &QueryConfig) -> PlanResult<QuerySpec> {
    config.validate()?;

    let mut merged = MergedContext::default();
    let projection = config
        .required_columns
        .as_deref()
        .map(|columns| merged.absorb(compile_projection(columns)))
        .transpose()?;
    let key_condition = config
        .key_expression
        .as_deref()
        .map(|text| compile_predicate(text).map_err(PlanError::from))
        .transpose()?
        .map(|compiled| merged.absorb(compiled))
        .transpose()?;
    let filter = config
        .filter_expression
        .as_deref()
        .map(|text| compile_predicate(text).map_err(PlanError::from))
        .transpose()?
        .map(|compiled| merged.absorb(compiled))
        .transpose()?;

    debug!(
        table = %config.table_name,
        names = merged.names.len(),
        values = merged.values.len(),
        "built query spec"
    );

    Ok(QuerySpec {
        table_name: config.table_name.clone(),
        index_name: config.index_name.clone(),
        max_page_size: config.page_size,
        projection_expression: projection,
        key_condition_expression: key_condition,
        filter_expression: filter,
        expression_attribute_names: merged.names,
        expression_attribute_values: merged.values,
        consistent_read: config.consistent_read,
        ascending: config.ascending,
        rate_limit: config.rate_limit,
        return_consumed_capacity: ReturnConsumedCapacity::Total,
    })
}

/// Accumulates substitution maps from independently compiled expressions.
#[derive(Debug, Default)]
struct MergedContext {
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl MergedContext {
    /// Union one compiled expression's maps into the accumulated context
    /// and hand back its wire text.
    ///
    /// One-sided symbols are kept as-is. A symbol present on both sides
    /// must bind the same value on both; an unconditional overwrite would
    /// silently corrupt whichever side was absorbed first.
    fn absorb(&mut self, compiled: CompiledExpression) -> PlanResult<String> {
        for (symbol, name) in compiled.names {
            match self.names.get(&symbol) {
                None => {
                    self.names.insert(symbol, name);
                }
                Some(existing) if *existing == name => {}
                Some(existing) => {
                    return Err(PlanError::PlaceholderCollision {
                        symbol,
                        existing: existing.clone(),
                        incoming: name,
                    });
                }
            }
        }
        for (symbol, value) in compiled.values {
            match self.values.get(&symbol) {
                None => {
                    self.values.insert(symbol, value);
                }
                Some(existing) if *existing == value => {}
                Some(existing) => {
                    return Err(PlanError::PlaceholderCollision {
                        symbol,
                        existing: format!("{existing:?}"),
                        incoming: format!("{value:?}"),
                    });
                }
            }
        }
        Ok(compiled.text)
    }
}
