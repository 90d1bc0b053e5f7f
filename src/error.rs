//! Error types for the preference cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::schema::ValueKind;

// == Cache Error Enum ==
/// Unified error type for the preference cache.
///
/// Durability outcomes are deliberately not represented here: a refused
/// commit-mode write is a [`WriteOutcome`](crate::cache::WriteOutcome),
/// not an error.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Operation invoked on a key the schema does not declare
    #[error("Key not declared in schema: {0}")]
    UnknownKey(String),

    /// Write carried a value whose shape differs from the key's declared kind
    #[error("Type mismatch for key '{key}': expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Schema failed load-time validation
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A typed accessor could not convert a value for this key
    #[error("Value conversion failed for key '{key}'")]
    Conversion {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the preference cache.
pub type Result<T> = std::result::Result<T, CacheError>;
