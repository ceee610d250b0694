//! RPC Error Types

use std::time::Duration;

use thiserror::Error;

/// Maximum number of characters of a response body kept in an error
pub const MAX_ERROR_BODY: usize = 256;

/// Failure of a single submit or query call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Connection, DNS or other network-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The per-request timeout elapsed
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Unexpected status or response shape
    #[error("{0}")]
    Protocol(String),

    /// Well-formed response without the success marker
    #[error("tx rejected: {0}")]
    Rejected(String),

    /// Read-back marker missing or value not decodable
    #[error("query failed: {0}")]
    Query(String),
}

/// RPC Result type
pub type RpcResult<T> = Result<T, RpcError>;

impl RpcError {
    /// Stable label for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Transport(_) => "transport",
            RpcError::Timeout(_) => "timeout",
            RpcError::Protocol(_) => "protocol",
            RpcError::Rejected(_) => "rejected",
            RpcError::Query(_) => "query",
        }
    }

    /// Build a rejection from a raw response body
    pub fn rejected(body: &[u8]) -> Self {
        RpcError::Rejected(flatten_body(body))
    }

    /// Classify a reqwest failure, reporting timeouts with the configured limit
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            RpcError::Timeout(timeout)
        } else if err.is_status() {
            RpcError::Protocol(err.to_string())
        } else {
            RpcError::Transport(err.to_string())
        }
    }
}

/// Render a response body as single-line text, truncated for reporting
pub fn flatten_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(MAX_ERROR_BODY)
        .collect();

    if text.chars().count() > MAX_ERROR_BODY {
        flat.push_str("...");
    }
    flat
}
