//! Handle type for DXF objects
//!
//! Handles identify entities and objects within a drawing. They appear on the
//! wire as hexadecimal strings (group 5 for the owning record, 330-369 for
//! pointers to other records).

use std::fmt;

/// A DXF object handle
///
/// Handle 0 is reserved and means "no object".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    /// The null/invalid handle (0)
    pub const NULL: Handle = Handle(0);

    /// Create a new handle from a raw value
    #[inline]
    pub const fn new(value: u32) -> Self {
        Handle(value)
    }

    /// Get the raw value
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Check if this is a null/invalid handle
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Parse the hexadecimal wire form (`"1A"`, `"1a"`, with or without padding).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        u32::from_str_radix(s, 16).ok().map(Handle)
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NULL
    }
}

impl From<u32> for Handle {
    fn from(value: u32) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u32 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

/// Displays the wire form: lower-case hex, no prefix.
impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}
