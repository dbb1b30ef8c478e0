//! Group code values
//!
//! The DXF reference assigns every group code a value type by range. A
//! [`ValueKind`] names that type and a [`GroupValue`] holds one decoded value.

use super::{BinaryChunk, Handle};
use std::fmt;

/// Type of value associated with a group code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Any integer width (int16, int32, int64, byte, bool)
    Integer,
    /// Double-precision floating-point (coordinates, distances, angles)
    Real,
    /// Text
    Str,
    /// Object handle (hex string)
    HexId,
    /// Binary data (hex string, at most 256 characters)
    Chunk,
}

impl ValueKind {
    /// Determine the value type from a raw integer group code.
    ///
    /// Returns `None` for codes outside every range the DXF reference defines.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            // Handles living inside string ranges
            5 | 105 => Some(ValueKind::HexId),

            // String values (0-9, 100-109, 300-309, 999)
            0..=9 | 100..=109 | 300..=309 | 999 => Some(ValueKind::Str),

            // Floating-point values
            10..=59 | 110..=149 | 210..=239 | 460..=469 => Some(ValueKind::Real),

            // Integers of every width, booleans included
            60..=79 | 90..=99 | 160..=179 | 270..=299 | 370..=389 | 400..=409 => {
                Some(ValueKind::Integer)
            }
            420..=429 | 440..=459 => Some(ValueKind::Integer),

            // Binary data (310-319)
            310..=319 => Some(ValueKind::Chunk),

            // Handle values (320-369, 390-399, 480-481)
            320..=369 | 390..=399 | 480..=481 => Some(ValueKind::HexId),

            // String handles / names (410-419, 430-439, 470-479)
            410..=419 | 430..=439 | 470..=479 => Some(ValueKind::Str),

            // Extended data
            1004 => Some(ValueKind::Chunk),
            1005 => Some(ValueKind::HexId),
            1000..=1009 => Some(ValueKind::Str),
            1010..=1059 => Some(ValueKind::Real),
            1060..=1071 => Some(ValueKind::Integer),

            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Str => "string",
            ValueKind::HexId => "handle",
            ValueKind::Chunk => "binary chunk",
        };
        f.write_str(name)
    }
}

/// A single decoded group value
#[derive(Debug, Clone, PartialEq)]
pub enum GroupValue {
    Integer(i64),
    Real(f64),
    Str(String),
    HexId(Handle),
    Chunk(BinaryChunk),
}

impl GroupValue {
    /// Coerce the text of a value line to `kind`.
    ///
    /// Numbers and handles tolerate surrounding padding; strings are taken
    /// verbatim.
    pub fn parse(kind: ValueKind, text: &str) -> Option<Self> {
        match kind {
            ValueKind::Integer => text.trim().parse::<i64>().ok().map(GroupValue::Integer),
            ValueKind::Real => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(GroupValue::Real),
            ValueKind::Str => Some(GroupValue::Str(text.to_string())),
            ValueKind::HexId => Handle::from_hex(text).map(GroupValue::HexId),
            ValueKind::Chunk => BinaryChunk::new(text.trim()).ok().map(GroupValue::Chunk),
        }
    }

    /// The kind this value belongs to
    pub fn kind(&self) -> ValueKind {
        match self {
            GroupValue::Integer(_) => ValueKind::Integer,
            GroupValue::Real(_) => ValueKind::Real,
            GroupValue::Str(_) => ValueKind::Str,
            GroupValue::HexId(_) => ValueKind::HexId,
            GroupValue::Chunk(_) => ValueKind::Chunk,
        }
    }

    /// Format the value line, doubles with `precision` fractional digits.
    pub fn format(&self, precision: usize) -> String {
        match self {
            GroupValue::Integer(v) => v.to_string(),
            GroupValue::Real(v) => format!("{:.*}", precision, v),
            GroupValue::Str(s) => s.clone(),
            GroupValue::HexId(h) => format!("{:x}", h),
            GroupValue::Chunk(c) => c.as_str().to_string(),
        }
    }

    /// True for an empty string, a null handle or an empty chunk.
    pub fn is_blank(&self) -> bool {
        match self {
            GroupValue::Integer(_) | GroupValue::Real(_) => false,
            GroupValue::Str(s) => s.is_empty(),
            GroupValue::HexId(h) => h.is_null(),
            GroupValue::Chunk(c) => c.is_empty(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            GroupValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            GroupValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GroupValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            GroupValue::HexId(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_chunk(&self) -> Option<&BinaryChunk> {
        match self {
            GroupValue::Chunk(c) => Some(c),
            _ => None,
        }
    }
}

impl From<i64> for GroupValue {
    fn from(v: i64) -> Self {
        GroupValue::Integer(v)
    }
}

impl From<i32> for GroupValue {
    fn from(v: i32) -> Self {
        GroupValue::Integer(v as i64)
    }
}

impl From<bool> for GroupValue {
    fn from(v: bool) -> Self {
        GroupValue::Integer(v as i64)
    }
}

impl From<f64> for GroupValue {
    fn from(v: f64) -> Self {
        GroupValue::Real(v)
    }
}

impl From<&str> for GroupValue {
    fn from(v: &str) -> Self {
        GroupValue::Str(v.to_string())
    }
}

impl From<String> for GroupValue {
    fn from(v: String) -> Self {
        GroupValue::Str(v)
    }
}

impl From<Handle> for GroupValue {
    fn from(v: Handle) -> Self {
        GroupValue::HexId(v)
    }
}

impl From<BinaryChunk> for GroupValue {
    fn from(v: BinaryChunk) -> Self {
        GroupValue::Chunk(v)
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(6))
    }
}
