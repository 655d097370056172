//! Store-client interface and pagination drivers.
//!
//! The planner never performs I/O itself; [`TableStore`] is the seam the
//! execution layer plugs its transport into. The drivers below run one
//! spec's pagination loop to completion without retrying: a failed page
//! surfaces immediately, and since every spec plus continuation token is
//! a pure request, the execution layer may retry it idempotently.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use dynoscan_model::{AttributeValue, QueryPage, QueryRequest, ScanPage, ScanRequest};

use crate::planner::SegmentCursor;
use crate::spec::{QuerySpec, ScanSpec};

/// One table item.
pub type Item = HashMap<String, AttributeValue>;

/// Transport-agnostic handle on a partitioned key-value store.
///
/// Implementations own the network, auth, and throttling concerns;
/// errors they surface are opaque to the planner.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Fetch one page of a scan.
    async fn scan_page(&self, request: ScanRequest) -> anyhow::Result<ScanPage>;

    /// Fetch one page of a query.
    async fn query_page(&self, request: QueryRequest) -> anyhow::Result<QueryPage>;
}

/// Read one scan segment to exhaustion, returning its items in page order.
///
/// # Errors
///
/// Returns the first page error as-is; the partially read segment is
/// discarded and the caller may re-run the spec from scratch or resume
/// with its own cursor.
pub async fn read_scan_segment<S>(store: &S, spec: ScanSpec) -> anyhow::Result<Vec<Item>>
where
    S: TableStore + ?Sized,
{
    let segment = spec.segment;
    let mut cursor = SegmentCursor::new(spec);
    let mut items = Vec::new();
    let mut pages = 0_u32;

    while let Some(request) = cursor.next_request() {
        let page = store.scan_page(request).await?;
        pages += 1;
        items.extend(page.items.iter().cloned());
        cursor.record_page(&page);
    }

    debug!(segment, pages, items = items.len(), "scan segment complete");
    Ok(items)
}

/// Read a query to exhaustion, returning its items in page order.
///
/// A query is a single stream, so the token loop runs inline rather than
/// through a segment cursor.
///
/// # Errors
///
/// Returns the first page error as-is.
pub async fn read_query<S>(store: &S, spec: QuerySpec) -> anyhow::Result<Vec<Item>>
where
    S: TableStore + ?Sized,
{
    let mut items = Vec::new();
    let mut token: Item = HashMap::new();
    let mut pages = 0_u32;

    loop {
        let page = store.query_page(spec.to_request(token)).await?;
        pages += 1;
        items.extend(page.items.iter().cloned());
        if !page.has_more() {
            break;
        }
        token = page.last_evaluated_key.clone();
    }

    debug!(table = %spec.table_name, pages, items = items.len(), "query complete");
    Ok(items)
}
