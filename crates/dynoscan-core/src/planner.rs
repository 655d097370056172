//! Segment planning and the per-segment pagination contract.
//!
//! Planning is pure: one validated config is stamped into `total_segments`
//! independent specs, one per segment index. Each worker then drives its
//! own [`SegmentCursor`] through `NotStarted -> HasMore -> Exhausted`,
//! feeding back the store's last-evaluated key between pages. Retrying a
//! failed page is the execution layer's business; a cursor only advances
//! when a page is recorded.

use std::collections::HashMap;

use tracing::debug;

use dynoscan_model::{AttributeValue, ScanPage, ScanRequest};

use crate::config::ScanConfig;
use crate::error::PlanResult;
use crate::spec::{ScanSpec, build_scan_spec};

/// Produce one independently executable spec per segment.
///
/// The returned specs differ only in `segment` and share no mutable
/// state; segment indices cover `0..total_segments` exactly once each.
///
/// # Errors
///
/// Returns [`crate::error::PlanError`] if the config fails validation or
/// its expressions fail to compile.
pub fn plan_segments(config: &ScanConfig) -> PlanResult<Vec<ScanSpec>> {
    let base = build_scan_spec(config)?;
    debug!(
        table = %base.table_name,
        total_segments = base.total_segments,
        "planned parallel scan"
    );
    Ok((0..base.total_segments)
        .map(|segment| ScanSpec {
            segment,
            ..base.clone()
        })
        .collect())
}

/// Pagination state of one scan segment.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentState {
    /// No page requested yet.
    NotStarted,
    /// The store returned a continuation token; more pages remain.
    HasMore(HashMap<String, AttributeValue>),
    /// The store returned a page without a continuation token.
    Exhausted,
}

/// Drives one segment's pagination over an otherwise-immutable spec.
#[derive(Debug)]
pub struct SegmentCursor {
    spec: ScanSpec,
    state: SegmentState,
}

impl SegmentCursor {
    /// Create a cursor at `NotStarted` for one segment's spec.
    #[must_use]
    pub fn new(spec: ScanSpec) -> Self {
        Self {
            spec,
            state: SegmentState::NotStarted,
        }
    }

    /// Segment index this cursor reads.
    #[must_use]
    pub fn segment(&self) -> u32 {
        self.spec.segment
    }

    /// The spec this cursor paginates.
    #[must_use]
    pub fn spec(&self) -> &ScanSpec {
        &self.spec
    }

    /// Returns `true` once the store has reported no further pages.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, SegmentState::Exhausted)
    }

    /// Render the next page request, or `None` after exhaustion.
    ///
    /// The request carries the current continuation token (absent on the
    /// first page) and may be re-submitted safely: the cursor only moves
    /// when [`Self::record_page`] is called.
    #[must_use]
    pub fn next_request(&self) -> Option<ScanRequest> {
        match &self.state {
            SegmentState::NotStarted => Some(self.spec.to_request(HashMap::new())),
            SegmentState::HasMore(token) => Some(self.spec.to_request(token.clone())),
            SegmentState::Exhausted => None,
        }
    }

    /// Record one page response, advancing to `HasMore` or `Exhausted`.
    pub fn record_page(&mut self, page: &ScanPage) {
        if page.has_more() {
            self.state = SegmentState::HasMore(page.last_evaluated_key.clone());
        } else {
            debug!(segment = self.spec.segment, "segment exhausted");
            self.state = SegmentState::Exhausted;
        }
    }
}
