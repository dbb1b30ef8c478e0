//! Error types for the DXF entity codec

use crate::types::ValueKind;
use std::io;
use thiserror::Error;

/// Main error type for codec operations
#[derive(Debug, Error)]
pub enum DxfError {
    /// IO error occurred while reading or writing the stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended where a group code was expected
    #[error("end of stream after line {line}")]
    EndOfStream { line: usize },

    /// The stream ended between a group code and its value
    #[error("unexpected end of stream after group code {code} at line {line}")]
    UnexpectedEof { line: usize, code: i32 },

    /// A group-code line was not an integer
    #[error("invalid group code at line {line}: {text:?}")]
    InvalidGroupCode { line: usize, text: String },

    /// A value line could not be coerced to the expected kind
    #[error("malformed {kind} value for group code {code} at line {line}: {text:?}")]
    MalformedValue {
        line: usize,
        code: i32,
        kind: ValueKind,
        text: String,
    },

    /// Version not usable for the requested operation
    #[error("Unsupported DXF version: {0}")]
    UnsupportedVersion(String),

    /// A field name that the record's schema does not define
    #[error("unknown field {field:?} for {entity}")]
    UnknownField { entity: String, field: String },

    /// A value of the wrong kind for a field
    #[error("field {field:?} expects a {expected} value, got {found}")]
    KindMismatch {
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A value rejected by a field's range constraint
    #[error("value {value} out of range for field {field:?}")]
    OutOfRange { field: String, value: String },

    /// A required field has neither a value nor a default
    #[error("required field {0:?} has no value")]
    MissingField(String),

    /// Malformed binary chunk text
    #[error("invalid binary chunk: {0}")]
    InvalidChunk(String),

    /// Every 32-bit handle is already in use
    #[error("handle space exhausted")]
    HandlesExhausted,

    /// Caller/programmer error, e.g. freeing a linked record
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Error while walking the sections of a DXF file
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DxfError {
    /// Whether the error leaves the stream unusable for further decoding.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DxfError::MalformedValue { .. })
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, DxfError>;

/// A rejected free: the record is handed back untouched.
#[derive(Debug, Error)]
#[error("invariant violation: {reason}")]
pub struct FreeError<T> {
    pub reason: &'static str,
    pub record: T,
}

impl<T> FreeError<T> {
    /// Recover the record whose free was refused.
    pub fn into_inner(self) -> T {
        self.record
    }
}

impl<T> From<FreeError<T>> for DxfError {
    fn from(err: FreeError<T>) -> Self {
        DxfError::InvariantViolation(err.reason.to_string())
    }
}
