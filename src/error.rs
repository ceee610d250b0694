//! Error types for kvbench

use thiserror::Error;

use crate::rpc::RpcError;

/// Result type alias for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Main error type for benchmark setup and execution
#[derive(Error, Debug, Clone)]
pub enum BenchError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        param: Option<String>,
    },

    // Endpoint errors surfaced outside the per-transaction boundary
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BenchError {
    /// Shorthand for a validation failure on a named parameter
    pub fn invalid(param: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            param: Some(param.to_string()),
        }
    }

    pub fn error_type(&self) -> &str {
        match self {
            Self::Config(_) => "configuration_error",
            Self::Validation { .. } => "validation_error",
            Self::Rpc(e) => e.kind(),
            Self::Internal(_) => "internal_error",
        }
    }

    /// The offending parameter, if this is a validation error
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::Validation { param, .. } => param.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for BenchError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("worker task failed: {}", err))
    }
}
