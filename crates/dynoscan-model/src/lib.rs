//! DynamoDB wire-level model types for dynoscan.
//!
//! This crate holds the request/response shapes the scan planner emits and
//! consumes. DynamoDB's JSON protocol makes serde derives trivial, so the
//! types are hand-written; the only custom serialization lives in
//! [`AttributeValue`], whose wire form is a single-key tagged object.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod page;
pub mod request;
pub mod types;

pub use attribute_value::AttributeValue;
pub use page::{QueryPage, ScanPage};
pub use request::{QueryRequest, ScanRequest};
pub use types::{Capacity, ConsumedCapacity, ReturnConsumedCapacity};
