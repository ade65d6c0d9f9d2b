//! Parser configuration model.

use serde::{Deserialize, Serialize};

/// Limits applied while tokenizing and parsing CDL source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum depth of nested literal arrays (`{ { ... } }`).
    pub max_nesting_depth: usize,
    /// Maximum accepted source length in bytes, unlimited when `None`.
    pub max_source_bytes: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: crate::constants::DEFAULT_MAX_NESTING_DEPTH,
            max_source_bytes: None,
        }
    }
}
