//! DXF writer module

mod section_writer;
mod stream_writer;
mod tag_writer;

pub use section_writer::SectionWriter;
pub use stream_writer::{DxfStreamWriter, DxfStreamWriterExt};
pub use tag_writer::{TagWriter, DEFAULT_PRECISION};

use super::code_page::text_encoding;
use crate::document::DxfDocument;
use crate::error::Result;
use crate::types::DxfVersion;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Configuration for the DXF writer.
#[derive(Debug, Clone)]
pub struct DxfWriterConfiguration {
    /// Target version. `None` writes at the document's version, or R2000 when
    /// the document version is unknown.
    pub version: Option<DxfVersion>,
    /// Fractional digits written for doubles.
    pub precision: usize,
}

impl Default for DxfWriterConfiguration {
    fn default() -> Self {
        Self {
            version: None,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// DXF file writer
pub struct DxfWriter<'a> {
    document: &'a DxfDocument,
    config: DxfWriterConfiguration,
}

impl<'a> DxfWriter<'a> {
    /// Create a writer for `document` with the default configuration
    pub fn new(document: &'a DxfDocument) -> Self {
        Self {
            document,
            config: DxfWriterConfiguration::default(),
        }
    }

    /// Set the writer configuration.
    pub fn with_configuration(mut self, config: DxfWriterConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Version records are written for.
    pub fn version(&self) -> DxfVersion {
        match self.config.version {
            Some(version) => version,
            None if self.document.version.is_known() => self.document.version,
            None => DxfVersion::R2000,
        }
    }

    /// Write to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to_writer(BufWriter::new(file))
    }

    /// Write to any writer
    pub fn write_to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let encoding = text_encoding(self.version(), self.document.code_page.as_deref());
        let mut stream_writer = TagWriter::new(writer)
            .with_precision(self.config.precision)
            .with_encoding(encoding);
        self.write_dxf(&mut stream_writer)?;
        stream_writer.flush()
    }

    /// Write to a byte vector (useful for testing)
    pub fn write_to_vec(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to_writer(&mut buffer)?;
        Ok(buffer)
    }

    /// Write DXF content to a stream writer
    pub fn write_dxf<W: DxfStreamWriter>(&self, writer: &mut W) -> Result<()> {
        let mut section_writer = SectionWriter::new(writer, self.version());

        section_writer.write_header(self.document)?;
        section_writer.write_tables(self.document)?;
        section_writer.write_entities(self.document)?;
        section_writer.write_objects(self.document)?;

        writer.write_eof()
    }

    /// Get a reference to the document
    pub fn document(&self) -> &DxfDocument {
        self.document
    }
}
