//! Error types for equiv-core
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for equiv-core operations
#[derive(Debug, Error)]
pub enum EquivError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Solver process failed (spawn failure, crash, `(error ...)` response)
    #[error("Solver error: {0}")]
    Solver(String),

    /// A query could not be rendered (ill-typed or unsupported expression)
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// Classification inputs violate a precondition of the decision function
    #[error("Classification precondition violated: {0}")]
    Precondition(String),

    /// Symbolic path source or instrumentation failure
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query abandoned because the run was stopped
    #[error("Query cancelled")]
    Cancelled,

    /// Results file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Result store error
    #[error("Storage error: {0}")]
    Storage(#[from] equiv_storage::StorageError),

    /// JSON (trace files)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EquivError {
    pub fn solver(msg: impl Into<String>) -> Self {
        EquivError::Solver(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        EquivError::MalformedQuery(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        EquivError::Precondition(msg.into())
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        EquivError::Analysis(msg.into())
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        EquivError::Parse(msg.into())
    }
}

/// Result type alias for equiv-core operations
pub type Result<T> = std::result::Result<T, EquivError>;
