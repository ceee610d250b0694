//! Response inspection
//!
//! The node's JSON responses are not decoded structurally. Submission
//! success is a substring test on the raw body and query values are cut out
//! of the text around a fixed marker, matching what the node actually emits.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use super::{RpcError, RpcResult};

/// Literal marker of an accepted transaction
pub const SUCCESS_MARKER: &[u8] = br#""code":0"#;

/// Literal prefix of a query value
pub const VALUE_MARKER: &[u8] = br#""value":""#;

/// Check a `broadcast_tx_commit` response.
///
/// Accepted only on HTTP 200 with a non-empty body containing `"code":0`.
pub fn check_submit(status: u16, body: &[u8]) -> RpcResult<()> {
    if body.is_empty() || status != 200 {
        return Err(RpcError::Protocol(format!("bad HTTP {}", status)));
    }
    if !contains(body, SUCCESS_MARKER) {
        return Err(RpcError::rejected(body));
    }
    Ok(())
}

/// Extract and base64-decode the value of an `abci_query` response.
///
/// The token runs from the first `"value":"` to the next `"`, or to the end
/// of the body if no closing quote follows.
pub fn extract_value(body: &[u8]) -> RpcResult<Bytes> {
    let start = find(body, VALUE_MARKER)
        .map(|pos| pos + VALUE_MARKER.len())
        .ok_or_else(|| RpcError::Query("no value".to_string()))?;

    let rest = &body[start..];
    let token = match rest.iter().position(|b| *b == b'"') {
        Some(end) => &rest[..end],
        None => rest,
    };

    STANDARD
        .decode(token)
        .map(Bytes::from)
        .map_err(|e| RpcError::Query(format!("invalid base64 value: {}", e)))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}
