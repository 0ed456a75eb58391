//! Error types for piwik-custom-vars.
//!
//! Building and serializing a [`CustomVariableSet`](crate::CustomVariableSet)
//! cannot fail. The only fallible surface is reading the indexed wire
//! format back, which is what these errors describe.

use thiserror::Error;

/// Errors raised while parsing the indexed custom-variable format.
#[derive(Debug, Error)]
pub enum CustomVarsError {
    #[error("Malformed custom variable JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Field name '{field}' is not a positive decimal index")]
    InvalidIndex {
        field: String,
    },

    #[error("Index {found} is out of sequence for {expected} entries")]
    IndexGap {
        expected: usize,
        found: usize,
    },
}

impl CustomVarsError {
    /// Create an invalid index error.
    pub fn invalid_index(field: impl Into<String>) -> Self {
        Self::InvalidIndex {
            field: field.into(),
        }
    }
}
