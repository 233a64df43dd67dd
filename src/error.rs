//! Error types for lexicon code generation

use thiserror::Error;

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Code generation errors
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Cannot normalize identifier '{identifier}': {reason}")]
    Normalization { identifier: String, reason: String },

    #[error("Symbol collision: '{first}' and '{second}' both normalize to {symbol}")]
    SymbolCollision {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid declarations: {0}")]
    Formatting(String),

    #[error("Cannot persist buffer for {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodegenError {
    pub(crate) fn normalization(identifier: &str, reason: impl Into<String>) -> Self {
        Self::Normalization {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn persistence(path: &str, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
