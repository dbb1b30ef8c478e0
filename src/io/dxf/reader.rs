//! DXF file reader

mod section_reader;
mod tag_reader;

pub use tag_reader::TagReader;

use super::code_page::text_encoding;
use crate::document::DxfDocument;
use crate::error::Result;
use crate::notification::NotificationType;
use crate::schema::SchemaRegistry;
use crate::types::DxfVersion;
use section_reader::{HeaderInfo, SectionReader};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// Configuration for the DXF reader.
#[derive(Debug, Clone, Default)]
pub struct DxfReaderConfiguration {
    /// When `true`, errors within a section are reported as notifications and
    /// the reader moves on to the next section instead of aborting.
    ///
    /// Default: `false` (strict mode; errors propagate).
    pub failsafe: bool,

    /// When `true`, ENTITIES and OBJECTS are split into record blocks that
    /// are decoded on the rayon thread pool.
    ///
    /// Default: `false`.
    pub parallel: bool,
}

/// DXF file reader
pub struct DxfReader<R: BufRead + Seek> {
    inner: R,
    config: DxfReaderConfiguration,
    registry: Arc<SchemaRegistry>,
}

impl DxfReader<BufReader<File>> {
    /// Create a new DXF reader from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> DxfReader<BufReader<R>> {
    /// Create a new DXF reader from any seekable reader
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<R: BufRead + Seek> DxfReader<R> {
    /// Create a reader over a buffered stream using the built-in schemas.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            config: DxfReaderConfiguration::default(),
            registry: SchemaRegistry::builtin(),
        }
    }

    /// Set the reader configuration.
    pub fn with_configuration(mut self, config: DxfReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Decode with `registry` instead of the built-in schemas.
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Read the whole stream into a [`DxfDocument`].
    pub fn read(mut self) -> Result<DxfDocument> {
        let header = self.read_header()?;
        self.inner.seek(SeekFrom::Start(0))?;

        let mut document = DxfDocument::with_version(header.version);
        document.code_page = header.code_page;
        if !header.version.is_known() {
            document.notifications.notify(
                NotificationType::Warning,
                "no recognized $ACADVER; fields are read without version gating",
            );
        }

        let encoding = text_encoding(header.version, document.code_page.as_deref());
        let mut reader = TagReader::new(&mut self.inner)
            .with_version(header.version)
            .with_encoding(encoding);
        let failsafe = self.config.failsafe;

        while let Some((code, value)) = reader.read_pair()? {
            if code == 0 && value == "EOF" {
                break;
            }
            if code != 0 || value != "SECTION" {
                continue;
            }
            let Some((2, section_name)) = reader.read_pair()? else {
                continue;
            };

            let mut sections = SectionReader::new(&mut reader, &self.registry, self.config.parallel);
            let result = match section_name.as_str() {
                // Already taken in by the pre-scan
                "HEADER" => sections.skip_section(),
                "TABLES" => sections.read_tables(&mut document),
                "ENTITIES" | "OBJECTS" => sections.read_records(&section_name, &mut document),
                _ => {
                    document.notifications.notify(
                        NotificationType::NotImplemented,
                        format!("{} section skipped", section_name),
                    );
                    sections.skip_section()
                }
            };

            // In failsafe mode, catch errors and continue
            if let Err(e) = result {
                if failsafe {
                    document.notifications.notify(
                        NotificationType::Error,
                        format!("Error reading {} section: {}", section_name, e),
                    );
                    if let Err(e) = sections.skip_section() {
                        document.notifications.notify(
                            NotificationType::Error,
                            format!("Could not skip past {} section, reading stopped: {}", section_name, e),
                        );
                        break;
                    }
                } else {
                    return Err(e);
                }
            }
        }

        document.resolve_handles();
        Ok(document)
    }

    /// Pre-scan the HEADER section for `$ACADVER` and `$DWGCODEPAGE`.
    ///
    /// Only the first section is looked at; a file that does not start with
    /// HEADER has an unknown version.
    fn read_header(&mut self) -> Result<HeaderInfo> {
        let mut reader = TagReader::new(&mut self.inner);
        while let Some((code, value)) = reader.read_pair()? {
            if code != 0 || value != "SECTION" {
                continue;
            }
            if let Some((2, name)) = reader.read_pair()? {
                if name == "HEADER" {
                    return SectionReader::new(&mut reader, &self.registry, false).read_header();
                }
            }
            break;
        }
        Ok(HeaderInfo {
            version: DxfVersion::Unknown,
            code_page: None,
        })
    }
}
