//! Expression-aware segmented table-scan planner.
//!
//! Turns a declarative [`config::ScanConfig`] or [`config::QueryConfig`]
//! into store-ready request specs: caller-supplied filter/key text is
//! parsed and compiled into placeholder-only wire expressions, the
//! resulting substitution maps are merged with collision checking, and a
//! parallel scan is stamped out into `total_segments` independently
//! paginated specs. Everything here is pure computation; I/O happens
//! behind the [`store::TableStore`] seam.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod expression;
pub mod planner;
pub mod spec;
pub mod store;

pub use config::{QueryConfig, ScanConfig};
pub use credentials::{Credentials, CredentialsProvider, CredentialsRegistry};
pub use error::{PlanError, PlanResult};
pub use planner::{SegmentCursor, SegmentState, plan_segments};
pub use spec::{QuerySpec, ScanSpec, build_query_spec, build_scan_spec};
pub use store::{Item, TableStore, read_query, read_scan_segment};
