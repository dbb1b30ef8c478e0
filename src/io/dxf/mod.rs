//! DXF (Drawing Exchange Format) reading and writing

mod code_page;
mod reader;
mod writer;

pub use code_page::{
    code_page_for_encoding, encoding_from_code_page, text_encoding, DEFAULT_CODE_PAGE,
};
pub use reader::{DxfReader, DxfReaderConfiguration, TagReader};
pub use writer::{
    DxfStreamWriter, DxfStreamWriterExt, DxfWriter, DxfWriterConfiguration, SectionWriter,
    TagWriter, DEFAULT_PRECISION,
};

use crate::document::DxfDocument;
use crate::error::Result;
use std::path::Path;

/// Read a DXF file with the default configuration.
pub fn read_dxf<P: AsRef<Path>>(path: P) -> Result<DxfDocument> {
    DxfReader::from_file(path)?.read()
}

/// Write a document to a DXF file at its own version.
pub fn write_dxf<P: AsRef<Path>>(document: &DxfDocument, path: P) -> Result<()> {
    DxfWriter::new(document).write_to_file(path)
}
