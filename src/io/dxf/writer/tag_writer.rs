//! ASCII DXF tag writer

use super::stream_writer::DxfStreamWriter;
use crate::codec::TagDirective;
use crate::error::{DxfError, Result};
use crate::types::GroupValue;
use encoding_rs::Encoding;
use std::io::Write;

/// Default number of fractional digits for doubles
pub const DEFAULT_PRECISION: usize = 6;

/// ASCII DXF stream writer
pub struct TagWriter<W: Write> {
    writer: W,
    precision: usize,
    /// Code page for string values; `None` writes UTF-8.
    encoding: Option<&'static Encoding>,
}

impl<W: Write> TagWriter<W> {
    /// Create a writer with 6-digit doubles
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            precision: DEFAULT_PRECISION,
            encoding: None,
        }
    }

    /// Set the number of fractional digits for doubles
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Encode string values with `encoding` instead of UTF-8.
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Write a group code right-aligned in a 3-character field
    fn write_code(&mut self, code: i32) -> Result<()> {
        writeln!(self.writer, "{:>3}", code)?;
        Ok(())
    }

    /// Get the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DxfStreamWriter for TagWriter<W> {
    fn write_directive(&mut self, directive: &TagDirective) -> Result<()> {
        if let GroupValue::Str(text) = &directive.value {
            if text.contains(['\n', '\r']) {
                return Err(DxfError::InvariantViolation(format!(
                    "value of group code {} spans more than one line",
                    directive.code
                )));
            }
        }
        self.write_code(directive.code)?;
        match (&directive.value, self.encoding) {
            (GroupValue::Str(text), Some(encoding)) => {
                let (bytes, _, _) = encoding.encode(text);
                self.writer.write_all(&bytes)?;
                self.writer.write_all(b"\n")?;
            }
            (value, _) => writeln!(self.writer, "{}", value.format(self.precision))?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
