//! Binary data chunks (group codes 310-319)
//!
//! Binary payloads such as proxy graphics are split over several `310` lines,
//! each carrying a hex-encoded slice. A chunk keeps the exact text it was read
//! with so that it is written back unchanged.

use crate::error::{DxfError, Result};
use std::fmt;

/// Maximum number of hex characters a single chunk line may hold.
pub const MAX_CHUNK_LENGTH: usize = 256;

/// Bytes per chunk when splitting a payload (254 hex characters per line).
pub const BYTES_PER_CHUNK: usize = 127;

/// One hex-encoded line of binary data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BinaryChunk {
    text: String,
}

impl BinaryChunk {
    /// Create a chunk from its hex text.
    ///
    /// The text must be at most [`MAX_CHUNK_LENGTH`] characters of hex digits
    /// with an even count.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.len() > MAX_CHUNK_LENGTH {
            return Err(DxfError::InvalidChunk(format!(
                "{} characters exceeds the {} character limit",
                text.len(),
                MAX_CHUNK_LENGTH
            )));
        }
        if let Some(c) = text.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(DxfError::InvalidChunk(format!("non-hex character {:?}", c)));
        }
        if text.len() % 2 != 0 {
            return Err(DxfError::InvalidChunk("odd number of hex digits".to_string()));
        }
        Ok(Self { text })
    }

    /// Encode raw bytes as a single chunk (upper-case hex).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut text = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            text.push_str(&format!("{:02X}", byte));
        }
        Self::new(text)
    }

    /// Split a payload into as many chunks as needed.
    pub fn split_bytes(bytes: &[u8]) -> Vec<BinaryChunk> {
        bytes
            .chunks(BYTES_PER_CHUNK)
            .map(|slice| {
                let text = slice.iter().map(|b| format!("{:02X}", b)).collect::<String>();
                BinaryChunk { text }
            })
            .collect()
    }

    /// The hex text as read or constructed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Decode the hex text into bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.text
            .as_bytes()
            .chunks(2)
            .filter_map(|pair| {
                let s = std::str::from_utf8(pair).ok()?;
                u8::from_str_radix(s, 16).ok()
            })
            .collect()
    }

    /// Number of payload bytes in this chunk.
    pub fn byte_len(&self) -> usize {
        self.text.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for BinaryChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
