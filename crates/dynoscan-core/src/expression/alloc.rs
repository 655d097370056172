//! Placeholder allocation for compiled expressions.
//!
//! One allocator lives for exactly one compile pass. Symbols are numbered
//! from zero, so two independent compiles can both hand out `#0` or `:0`;
//! the spec-builder merge reconciles that by comparing bound values, never
//! by trusting symbol freshness across compiles.

use std::collections::HashMap;

use dynoscan_model::AttributeValue;

/// Allocates `#n` name placeholders and `:n` value placeholders for one
/// compile pass.
///
/// Within a single pass, repeated attribute names and equal literals reuse
/// the symbol they were first given.
#[derive(Debug, Default)]
pub struct PlaceholderAllocator {
    names: Vec<(String, String)>,
    values: Vec<(String, AttributeValue)>,
}

impl PlaceholderAllocator {
    /// Create an allocator with both counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for an attribute name, reusing the symbol if the name
    /// was seen before in this pass.
    pub fn name_for(&mut self, attribute: &str) -> String {
        if let Some((symbol, _)) = self.names.iter().find(|(_, name)| name == attribute) {
            return symbol.clone();
        }
        let symbol = format!("#{}", self.names.len());
        self.names.push((symbol.clone(), attribute.to_owned()));
        symbol
    }

    /// Placeholder for a literal value, reusing the symbol if an equal
    /// literal was seen before in this pass.
    pub fn value_for(&mut self, literal: &AttributeValue) -> String {
        if let Some((symbol, _)) = self.values.iter().find(|(_, value)| value == literal) {
            return symbol.clone();
        }
        let symbol = format!(":{}", self.values.len());
        self.values.push((symbol.clone(), literal.clone()));
        symbol
    }

    /// Consume the allocator into the two substitution maps.
    #[must_use]
    pub fn into_maps(self) -> (HashMap<String, String>, HashMap<String, AttributeValue>) {
        (
            self.names.into_iter().collect(),
            self.values.into_iter().collect(),
        )
    }
}
