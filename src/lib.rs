//! # dxf-entity-codec
//!
//! A table-driven codec for the DXF tag stream.
//!
//! Every entity, object and table entry type is described by an
//! [`EntitySchema`]: an ordered list of [`FieldSlot`]s that binds group codes
//! to named fields, repeatable sub-record chains or fixed marker lines. One
//! generic [`EntityCodec`] turns a schema into a decoder and an encoder, so
//! adding a record type means writing its table, not a parser.
//!
//! ## Features
//!
//! - Line-oriented ASCII tag reading and writing ([`TagReader`], [`TagWriter`])
//! - Version gating of fields from R9 through R2018
//! - `$DWGCODEPAGE` text decoding for pre-R2007 files
//! - Binary data chunks (310) and object-id references kept in owned
//!   [`LinkedChain`]s
//! - Field tables for INSERT, LIGHT, ACAD_PROXY_ENTITY, SPATIAL_INDEX and LTYPE
//! - Recoverable problems reported as [`Notification`]s instead of errors
//! - Optional parallel decoding of large ENTITIES/OBJECTS sections
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dxf_entity_codec::{DxfReader, DxfWriter};
//!
//! let doc = DxfReader::from_file("sample.dxf")?.read()?;
//! for notification in &doc.notifications {
//!     println!("{}", notification);
//! }
//! DxfWriter::new(&doc).write_to_file("output.dxf")?;
//! # Ok::<(), dxf_entity_codec::DxfError>(())
//! ```
//!
//! Single records can be decoded straight from a tag stream:
//!
//! ```rust
//! use dxf_entity_codec::entities::insert;
//! use dxf_entity_codec::{EntityCodec, NotificationCollection, TagReader};
//!
//! let text = "  8\nWALLS\n  2\nDOOR\n 10\n1.5\n  0\nEOF\n";
//! let mut reader = TagReader::new(text.as_bytes());
//! let mut notes = NotificationCollection::new();
//! let record = EntityCodec::new(insert::schema()).decode(&mut reader, &mut notes)?;
//! assert_eq!(record.get_str(insert::field::BLOCK_NAME), Some("DOOR"));
//! assert_eq!(record.get_real(insert::field::INSERT_X), Some(1.5));
//! # Ok::<(), dxf_entity_codec::DxfError>(())
//! ```

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod chain;
pub mod codec;
pub mod document;
pub mod entities;
pub mod error;
pub mod io;
pub mod notification;
pub mod objects;
pub mod record;
pub mod schema;
pub mod tables;
pub mod types;

// Re-export commonly used types
pub use chain::LinkedChain;
pub use codec::{EntityCodec, TagDirective};
pub use document::DxfDocument;
pub use error::{DxfError, Result};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use record::{EntityList, EntityRecord, FieldValue};
pub use schema::{EntitySchema, FieldSlot, RecordKind, SchemaRegistry};
pub use types::{BinaryChunk, DxfVersion, GroupValue, Handle, ObjectIdRef, ValueKind};

// Re-export I/O types
pub use io::dxf::{DxfReader, DxfReaderConfiguration, DxfWriter, DxfWriterConfiguration};
pub use io::dxf::{TagReader, TagWriter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
