//! DXF stream writer trait and common helpers

use crate::codec::{EntityCodec, TagDirective};
use crate::error::Result;
use crate::record::EntityRecord;
use crate::types::{BinaryChunk, DxfVersion, GroupValue, Handle};

/// Sink for code/value directives
pub trait DxfStreamWriter {
    /// Write one directive
    fn write_directive(&mut self, directive: &TagDirective) -> Result<()>;

    /// Flush the writer
    fn flush(&mut self) -> Result<()>;
}

/// Extension trait for convenient writing operations
pub trait DxfStreamWriterExt: DxfStreamWriter {
    fn write_value(&mut self, code: i32, value: impl Into<GroupValue>) -> Result<()> {
        self.write_directive(&TagDirective::new(code, value))
    }

    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_value(code, value)
    }

    fn write_int(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_value(code, value)
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_value(code, value)
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.write_value(code, handle)
    }

    fn write_chunk(&mut self, code: i32, chunk: &BinaryChunk) -> Result<()> {
        self.write_value(code, chunk.clone())
    }

    /// Encode `record` for `version` and emit its directives in schema order.
    ///
    /// Directives already written stay written if a later one fails.
    fn write_entity(
        &mut self,
        codec: &EntityCodec,
        record: &EntityRecord,
        version: DxfVersion,
    ) -> Result<()> {
        for directive in codec.encode(record, version)? {
            self.write_directive(&directive)?;
        }
        Ok(())
    }

    /// Write section start
    fn write_section_start(&mut self, section_name: &str) -> Result<()> {
        self.write_string(0, "SECTION")?;
        self.write_string(2, section_name)
    }

    /// Write section end
    fn write_section_end(&mut self) -> Result<()> {
        self.write_string(0, "ENDSEC")
    }

    /// Write end of file
    fn write_eof(&mut self) -> Result<()> {
        self.write_string(0, "EOF")
    }
}

impl<T: DxfStreamWriter> DxfStreamWriterExt for T {}

/// Collecting sink; keeps directives in memory.
impl DxfStreamWriter for Vec<TagDirective> {
    fn write_directive(&mut self, directive: &TagDirective) -> Result<()> {
        self.push(directive.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
