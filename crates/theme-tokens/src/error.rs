//! Errors raised while transforming a token tree.

use thiserror::Error;

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors from the token transform
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("token tree must be a mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("token '{token}' references unknown token '{reference}'")]
    UnknownReference { token: String, reference: String },

    #[error("circular token reference: {0}")]
    CircularReference(String),

    #[error("token tree nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("tokens '{first}' and '{second}' both map to variable name '{name}'")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
