//! Shared wire-level enums and capacity reporting types.

use serde::{Deserialize, Serialize};

/// Controls whether consumed capacity information is returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReturnConsumedCapacity {
    /// Return consumed capacity for the table and any indexes involved.
    #[serde(rename = "INDEXES")]
    Indexes,
    /// Return only the total consumed capacity.
    #[serde(rename = "TOTAL")]
    Total,
    /// Do not return consumed capacity (default).
    #[default]
    #[serde(rename = "NONE")]
    None,
}

impl ReturnConsumedCapacity {
    /// Returns the DynamoDB wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexes => "INDEXES",
            Self::Total => "TOTAL",
            Self::None => "NONE",
        }
    }

    /// Returns `true` if capacity tracking should be performed.
    #[must_use]
    pub fn should_report(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for ReturnConsumedCapacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity units consumed by an individual table or index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Capacity {
    /// The total read capacity units consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_capacity_units: Option<f64>,
    /// The total write capacity units consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_capacity_units: Option<f64>,
    /// The total capacity units consumed (read + write).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_units: Option<f64>,
}

/// Total capacity consumed by an operation.
///
/// Returned when `ReturnConsumedCapacity` is set to `TOTAL` or `INDEXES`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConsumedCapacity {
    /// The name of the table that was affected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// The total capacity units consumed by the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_units: Option<f64>,
    /// The total read capacity units consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_capacity_units: Option<f64>,
    /// The total write capacity units consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_capacity_units: Option<f64>,
    /// The capacity consumed by the table (excluding indexes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Capacity>,
}
