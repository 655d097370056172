//! Scan and query configuration.
//!
//! Configs are immutable request descriptors validated eagerly at
//! spec-build time; nothing here touches the network. Transport-facing
//! fields (region, endpoint, credentials provider, rate limit) are carried
//! opaquely for the execution layer.

use typed_builder::TypedBuilder;

use crate::error::{PlanError, PlanResult};

/// Maximum allowed value for `total_segments` in a parallel scan.
pub const MAX_TOTAL_SEGMENTS: u32 = 1_000_000;

/// Maximum number of items one page request may evaluate.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// Default page size when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Configuration for a (possibly parallel) table scan.
///
/// # Examples
///
/// ```
/// use dynoscan_core::config::ScanConfig;
///
/// let config = ScanConfig::builder()
///     .table_name("orders".to_owned())
///     .total_segments(4)
///     .segment(2)
///     .page_size(100)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct ScanConfig {
    /// Name of the table to scan. Required, non-empty.
    pub table_name: String,

    /// Name of a secondary index to scan, opaque to the planner.
    #[builder(default)]
    pub index_name: Option<String>,

    /// Zero-based segment index this config addresses.
    #[builder(default = 0)]
    pub segment: u32,

    /// Total number of parallel segments.
    #[builder(default = 1)]
    pub total_segments: u32,

    /// Maximum number of items to evaluate per page.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Attributes to project. `None` returns whole items.
    #[builder(default)]
    pub required_columns: Option<Vec<String>>,

    /// Filter expression text in the predicate DSL.
    #[builder(default)]
    pub filter_expression: Option<String>,

    /// Read units per second granted to each segment's pagination loop.
    /// Enforced by the execution layer, not here.
    #[builder(default)]
    pub rate_limit: Option<u32>,

    /// Name of a registered credentials provider.
    #[builder(default)]
    pub credentials_provider: Option<String>,

    /// Store region.
    #[builder(default)]
    pub region: Option<String>,

    /// Endpoint override for the store client.
    #[builder(default)]
    pub endpoint: Option<String>,

    /// Request strongly consistent reads.
    #[builder(default)]
    pub consistent_read: Option<bool>,
}

impl ScanConfig {
    /// Validate the config eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Configuration`] on an empty table name, a
    /// segment/total-segments mismatch, an out-of-range page size, an
    /// empty projection, or a zero rate limit.
    pub fn validate(&self) -> PlanResult<()> {
        validate_common(
            &self.table_name,
            self.page_size,
            self.required_columns.as_deref(),
            self.rate_limit,
        )?;
        if self.total_segments == 0 || self.total_segments > MAX_TOTAL_SEGMENTS {
            return Err(PlanError::configuration(format!(
                "total_segments must be in 1..={MAX_TOTAL_SEGMENTS}, got {}",
                self.total_segments
            )));
        }
        if self.segment >= self.total_segments {
            return Err(PlanError::configuration(format!(
                "segment is zero-indexed and must be less than total_segments; \
                 segment: {}, total_segments: {}",
                self.segment, self.total_segments
            )));
        }
        Ok(())
    }
}

/// Configuration for a key-addressed query.
#[derive(Debug, Clone, TypedBuilder)]
pub struct QueryConfig {
    /// Name of the table to query. Required, non-empty.
    pub table_name: String,

    /// Name of a secondary index to query, opaque to the planner.
    #[builder(default)]
    pub index_name: Option<String>,

    /// Maximum number of items to evaluate per page.
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Attributes to project. `None` returns whole items.
    #[builder(default)]
    pub required_columns: Option<Vec<String>>,

    /// Key-condition expression text in the predicate DSL.
    #[builder(default)]
    pub key_expression: Option<String>,

    /// Filter expression text in the predicate DSL, applied after the key
    /// condition.
    #[builder(default)]
    pub filter_expression: Option<String>,

    /// Read units per second granted to the pagination loop. Enforced by
    /// the execution layer, not here.
    #[builder(default)]
    pub rate_limit: Option<u32>,

    /// Name of a registered credentials provider.
    #[builder(default)]
    pub credentials_provider: Option<String>,

    /// Store region.
    #[builder(default)]
    pub region: Option<String>,

    /// Endpoint override for the store client.
    #[builder(default)]
    pub endpoint: Option<String>,

    /// Request strongly consistent reads.
    #[builder(default)]
    pub consistent_read: Option<bool>,

    /// Sort-key traversal order; `false` reads descending.
    #[builder(default)]
    pub ascending: Option<bool>,
}

impl QueryConfig {
    /// Validate the config eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Configuration`] on an empty table name, an
    /// out-of-range page size, an empty projection, or a zero rate limit.
    pub fn validate(&self) -> PlanResult<()> {
        validate_common(
            &self.table_name,
            self.page_size,
            self.required_columns.as_deref(),
            self.rate_limit,
        )
    }
}

fn validate_common(
    table_name: &str,
    page_size: u32,
    required_columns: Option<&[String]>,
    rate_limit: Option<u32>,
) -> PlanResult<()> {
    if table_name.is_empty() {
        return Err(PlanError::configuration("table name must not be empty"));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(PlanError::configuration(format!(
            "page_size must be in 1..={MAX_PAGE_SIZE}, got {page_size}"
        )));
    }
    if let Some(columns) = required_columns {
        if columns.is_empty() {
            return Err(PlanError::configuration(
                "required_columns must not be empty when present",
            ));
        }
        if columns.iter().any(String::is_empty) {
            return Err(PlanError::configuration(
                "required_columns must not contain empty names",
            ));
        }
    }
    if rate_limit == Some(0) {
        return Err(PlanError::configuration("rate_limit must be positive"));
    }
    Ok(())
}
