//! Scan and query result pages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::types::ConsumedCapacity;

/// One page of `Scan` results.
///
/// An empty `last_evaluated_key` means the segment is exhausted; a non-empty
/// key must be fed back as `ExclusiveStartKey` to read the next page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanPage {
    /// The items that match the scan conditions on this page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<HashMap<String, AttributeValue>>,

    /// The number of items in the response.
    pub count: i32,

    /// The number of items evaluated before the filter expression was applied.
    pub scanned_count: i32,

    /// The primary key of the item where the scan stopped.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub last_evaluated_key: HashMap<String, AttributeValue>,

    /// The capacity units consumed by this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
}

impl ScanPage {
    /// Returns `true` if the store reported a further page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.last_evaluated_key.is_empty()
    }
}

/// One page of `Query` results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryPage {
    /// The items that match the query conditions on this page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<HashMap<String, AttributeValue>>,

    /// The number of items in the response.
    pub count: i32,

    /// The number of items evaluated before the filter expression was applied.
    pub scanned_count: i32,

    /// The primary key of the item where the query stopped.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub last_evaluated_key: HashMap<String, AttributeValue>,

    /// The capacity units consumed by this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
}

impl QueryPage {
    /// Returns `true` if the store reported a further page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.last_evaluated_key.is_empty()
    }
}
