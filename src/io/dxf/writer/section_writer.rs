//! DXF section writers
//!
//! HEADER carries only the variables the reader needs back (`$ACADVER`,
//! `$DWGCODEPAGE`, `$HANDSEED`); TABLES, ENTITIES and OBJECTS are written
//! list by list through the entity codec.

use super::stream_writer::{DxfStreamWriter, DxfStreamWriterExt};
use crate::codec::EntityCodec;
use crate::document::DxfDocument;
use crate::error::Result;
use crate::record::EntityList;
use crate::tables::{TABLE_END, TABLE_START, TABLE_SUBCLASS};
use crate::types::{DxfVersion, Handle};
use std::sync::Arc;

/// Writes all DXF sections
pub struct SectionWriter<'a, W: DxfStreamWriter> {
    writer: &'a mut W,
    version: DxfVersion,
}

impl<'a, W: DxfStreamWriter> SectionWriter<'a, W> {
    /// Create a section writer emitting records for `version`
    pub fn new(writer: &'a mut W, version: DxfVersion) -> Self {
        Self { writer, version }
    }

    /// Write the HEADER section
    pub fn write_header(&mut self, document: &DxfDocument) -> Result<()> {
        self.writer.write_section_start("HEADER")?;

        let version = self.version.as_version_string();
        self.write_header_variable("$ACADVER", |w| w.write_string(1, version))?;

        if let Some(code_page) = &document.code_page {
            self.write_header_variable("$DWGCODEPAGE", |w| w.write_string(3, code_page))?;
        }

        // Saturates once every handle is in use
        let seed = Handle::new(u32::try_from(document.next_handle()).unwrap_or(u32::MAX));
        self.write_header_variable("$HANDSEED", |w| w.write_handle(5, seed))?;

        self.writer.write_section_end()
    }

    /// Write a header variable
    fn write_header_variable<F>(&mut self, name: &str, write_value: F) -> Result<()>
    where
        F: FnOnce(&mut W) -> Result<()>,
    {
        self.writer.write_string(9, name)?;
        write_value(self.writer)
    }

    /// Write the TABLES section; nothing is written for a document without
    /// table entries.
    pub fn write_tables(&mut self, document: &DxfDocument) -> Result<()> {
        let mut tables = document.tables().filter(|(_, list)| !list.is_empty()).peekable();
        if tables.peek().is_none() {
            return Ok(());
        }

        self.writer.write_section_start("TABLES")?;
        for (name, entries) in tables {
            self.writer.write_string(0, TABLE_START)?;
            self.writer.write_string(2, name)?;
            if self.version >= DxfVersion::R13 {
                self.writer.write_string(100, TABLE_SUBCLASS)?;
            }
            self.writer.write_int(70, entries.len() as i64)?;
            self.write_list(entries)?;
            self.writer.write_string(0, TABLE_END)?;
        }
        self.writer.write_section_end()
    }

    /// Write the ENTITIES section
    pub fn write_entities(&mut self, document: &DxfDocument) -> Result<()> {
        self.writer.write_section_start("ENTITIES")?;
        for (_, list) in document.entities() {
            self.write_list(list)?;
        }
        self.writer.write_section_end()
    }

    /// Write the OBJECTS section, when the document has objects
    pub fn write_objects(&mut self, document: &DxfDocument) -> Result<()> {
        if document.object_count() == 0 {
            return Ok(());
        }
        self.writer.write_section_start("OBJECTS")?;
        for (_, list) in document.objects() {
            self.write_list(list)?;
        }
        self.writer.write_section_end()
    }

    /// Write every record of a homogeneous list with one codec.
    fn write_list(&mut self, list: &EntityList) -> Result<()> {
        let Some(first) = list.first() else {
            return Ok(());
        };
        let codec = EntityCodec::new(Arc::clone(first.schema()));
        for record in list {
            self.writer.write_entity(&codec, record, self.version)?;
        }
        Ok(())
    }
}
