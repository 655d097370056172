//! Error types for spec building and planning.

use crate::expression::ExpressionError;

/// Errors produced while validating configuration and building scan or
/// query specs.
///
/// Every variant is detected synchronously during spec construction,
/// before any request is issued against the store. Execution-layer
/// failures (timeouts, throttling) travel separately as `anyhow::Error`
/// through the store client.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The configuration failed eager validation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An expression failed to parse.
    #[error("invalid expression: {0}")]
    Syntax(#[from] ExpressionError),

    /// Merging two compiled expressions bound one placeholder symbol to
    /// two different attribute names or literals.
    #[error("placeholder collision on {symbol}: bound to {existing} and {incoming}")]
    PlaceholderCollision {
        /// The symbol bound on both sides.
        symbol: String,
        /// Rendering of the binding already present.
        existing: String,
        /// Rendering of the conflicting incoming binding.
        incoming: String,
    },
}

impl PlanError {
    /// Convenience constructor for configuration errors.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Convenience result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;
