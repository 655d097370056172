//! Integration tests for the dynoscan planner.
//!
//! The planner is pure computation, so these tests drive it end to end
//! against [`MemoryStore`], an in-memory [`TableStore`] that honors the
//! wire contract the planner emits: segment partitioning, page limits,
//! continuation tokens, placeholder-resolved projections, and simple
//! equality predicates.
#![allow(missing_docs, clippy::doc_markdown)]

#[cfg(test)]
mod test_plan;
#[cfg(test)]
mod test_query;
#[cfg(test)]
mod test_scan;

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use dynoscan_core::{Item, TableStore};
use dynoscan_model::{AttributeValue, QueryPage, QueryRequest, ScanPage, ScanRequest};

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Build an order item keyed by `pk`.
pub fn order_item(pk: &str, status: &str, total: i64) -> Item {
    let mut item = HashMap::new();
    item.insert("pk".to_owned(), AttributeValue::S(pk.to_owned()));
    item.insert("status".to_owned(), AttributeValue::S(status.to_owned()));
    item.insert("total".to_owned(), AttributeValue::N(total.to_string()));
    item
}

/// A small uniform table of `n` orders, every third one `shipped`.
pub fn order_table(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| {
            let status = if i % 3 == 0 { "shipped" } else { "open" };
            order_item(&format!("order#{i:04}"), status, i as i64)
        })
        .collect()
}

fn pk_of(item: &Item) -> &str {
    item.get("pk").and_then(AttributeValue::as_s).unwrap_or("")
}

fn segment_of(pk: &str, total_segments: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    pk.hash(&mut hasher);
    hasher.finish() % total_segments
}

/// Resolve a `#n` token through the request's name map; raw names pass
/// through.
fn resolve_name<'a>(token: &'a str, names: &'a HashMap<String, String>) -> &'a str {
    names.get(token).map_or(token, String::as_str)
}

/// Apply a single equality predicate of the form `lhs = rhs`, where `lhs`
/// resolves through the name map and `rhs` through the value map. That is
/// the only predicate shape these tests send over the fake.
fn apply_equality(
    text: &str,
    names: &HashMap<String, String>,
    values: &HashMap<String, AttributeValue>,
    items: Vec<Item>,
) -> Vec<Item> {
    let mut parts = text.split(" = ");
    let (Some(lhs), Some(rhs)) = (parts.next(), parts.next()) else {
        panic!("MemoryStore only understands equality predicates, got: {text}");
    };
    let attribute = resolve_name(lhs, names).to_owned();
    let expected = values
        .get(rhs)
        .unwrap_or_else(|| panic!("unresolved value placeholder {rhs} in: {text}"))
        .clone();
    items
        .into_iter()
        .filter(|item| item.get(&attribute) == Some(&expected))
        .collect()
}

/// Strip items down to the attributes a projection names.
fn apply_projection(text: &str, names: &HashMap<String, String>, items: Vec<Item>) -> Vec<Item> {
    let wanted: Vec<String> = text
        .split(',')
        .map(|token| resolve_name(token.trim(), names).to_owned())
        .collect();
    items
        .into_iter()
        .map(|item| {
            item.into_iter()
                .filter(|(key, _)| wanted.iter().any(|w| w == key))
                .collect()
        })
        .collect()
}

/// In-memory table honoring the scan/query wire contract.
///
/// Items are kept sorted by `pk`, so pagination order is deterministic.
/// Segment membership is `hash(pk) % total_segments`.
#[derive(Debug)]
pub struct MemoryStore {
    items: Vec<Item>,
    pages_served: AtomicUsize,
}

impl MemoryStore {
    pub fn new(mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| pk_of(a).cmp(pk_of(b)));
        Self {
            items,
            pages_served: AtomicUsize::new(0),
        }
    }

    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }

    /// Apply limit and produce the page plus continuation key.
    fn paginate(rows: Vec<Item>, limit: Option<i32>) -> (Vec<Item>, Item) {
        let limit = limit.map_or(rows.len(), |l| usize::try_from(l).unwrap_or(rows.len()));
        let has_more = rows.len() > limit;
        let page: Vec<Item> = rows.into_iter().take(limit).collect();
        let last_key = if has_more {
            let mut key = HashMap::new();
            if let Some(last) = page.last() {
                key.insert(
                    "pk".to_owned(),
                    AttributeValue::S(pk_of(last).to_owned()),
                );
            }
            key
        } else {
            HashMap::new()
        };
        (page, last_key)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn scan_page(&self, request: ScanRequest) -> anyhow::Result<ScanPage> {
        self.pages_served.fetch_add(1, Ordering::SeqCst);

        let total = u64::try_from(request.total_segments.unwrap_or(1))?;
        let segment = u64::try_from(request.segment.unwrap_or(0))?;
        let mut rows: Vec<Item> = self
            .items
            .iter()
            .filter(|item| segment_of(pk_of(item), total) == segment)
            .cloned()
            .collect();

        if let Some(start) = request.exclusive_start_key.get("pk").and_then(AttributeValue::as_s) {
            rows.retain(|item| pk_of(item) > start);
        }
        let scanned = i32::try_from(rows.len())?;
        if let Some(filter) = &request.filter_expression {
            rows = apply_equality(
                filter,
                &request.expression_attribute_names,
                &request.expression_attribute_values,
                rows,
            );
        }
        let (mut page, last_key) = Self::paginate(rows, request.limit);
        if let Some(projection) = &request.projection_expression {
            page = apply_projection(projection, &request.expression_attribute_names, page);
        }

        Ok(ScanPage {
            count: i32::try_from(page.len())?,
            scanned_count: scanned,
            items: page,
            last_evaluated_key: last_key,
            consumed_capacity: None,
        })
    }

    async fn query_page(&self, request: QueryRequest) -> anyhow::Result<QueryPage> {
        self.pages_served.fetch_add(1, Ordering::SeqCst);

        let mut rows: Vec<Item> = self.items.clone();
        if let Some(key_condition) = &request.key_condition_expression {
            rows = apply_equality(
                key_condition,
                &request.expression_attribute_names,
                &request.expression_attribute_values,
                rows,
            );
        }
        if request.scan_index_forward == Some(false) {
            rows.reverse();
        }
        if let Some(start) = request.exclusive_start_key.get("pk").and_then(AttributeValue::as_s) {
            if request.scan_index_forward == Some(false) {
                rows.retain(|item| pk_of(item) < start);
            } else {
                rows.retain(|item| pk_of(item) > start);
            }
        }
        let scanned = i32::try_from(rows.len())?;
        if let Some(filter) = &request.filter_expression {
            rows = apply_equality(
                filter,
                &request.expression_attribute_names,
                &request.expression_attribute_values,
                rows,
            );
        }
        let (mut page, last_key) = Self::paginate(rows, request.limit);
        if let Some(projection) = &request.projection_expression {
            page = apply_projection(projection, &request.expression_attribute_names, page);
        }

        Ok(QueryPage {
            count: i32::try_from(page.len())?,
            scanned_count: scanned,
            items: page,
            last_evaluated_key: last_key,
            consumed_capacity: None,
        })
    }
}
