//! Transaction encoding
//!
//! Builds the flat `key=value` payloads understood by the kvstore
//! application and decodes the fixed-width counters read back from it.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// Width in bytes of a serialized counter value
pub const COUNTER_WIDTH: usize = 8;

/// An immutable, encoded write ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    payload: Bytes,
}

impl Transaction {
    /// Wrap an already-encoded payload
    pub fn from_bytes(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Transaction for the fixed-count workload: `{prefix}_{index}={index}`
    pub fn indexed(prefix: &str, index: u64) -> Self {
        Self::from_bytes(encode(prefix, index))
    }

    /// Transaction for the rate workload: `{key}=` + little-endian counter
    pub fn counter(key: &str, value: u64) -> Self {
        Self::from_bytes(encode_counter(key, value))
    }

    /// Raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The `tx` query parameter value: `0x` followed by lowercase hex
    pub fn hex_param(&self) -> String {
        format!("0x{}", hex::encode(&self.payload))
    }

    /// Key portion of the payload (everything before the first `=`)
    pub fn key(&self) -> &[u8] {
        match self.payload.iter().position(|b| *b == b'=') {
            Some(pos) => &self.payload[..pos],
            None => &self.payload,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.payload))
    }
}

/// Encode `"{prefix}_{index}={index}"` as raw bytes
pub fn encode(prefix: &str, index: u64) -> Bytes {
    Bytes::from(format!("{}_{}={}", prefix, index, index))
}

/// Encode `"{key}="` followed by `value` as an 8-byte little-endian u64
pub fn encode_counter(key: &str, value: u64) -> Bytes {
    let mut buf = BytesMut::with_capacity(key.len() + 1 + COUNTER_WIDTH);
    buf.put_slice(key.as_bytes());
    buf.put_u8(b'=');
    buf.put_u64_le(value);
    buf.freeze()
}

/// Split a stored value into its little-endian counters.
///
/// Trailing bytes that do not fill a whole counter are ignored.
pub fn decode_counters(value: &[u8]) -> Vec<u64> {
    value
        .chunks_exact(COUNTER_WIDTH)
        .map(|chunk| {
            let mut word = [0u8; COUNTER_WIDTH];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect()
}

/// Sum of every counter in a stored value, saturating at `u64::MAX`
pub fn sum_counters(value: &[u8]) -> u64 {
    decode_counters(value)
        .into_iter()
        .fold(0u64, |acc, c| acc.saturating_add(c))
}
