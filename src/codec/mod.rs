//! Table-driven entity codec
//!
//! [`EntityCodec`] maps an [`EntitySchema`] onto the tag stream. Decoding
//! dispatches each group code through the schema's code index; encoding walks
//! the slots in declaration order and emits [`TagDirective`]s. Version gating,
//! default suppression and repeated-code handling all live here, so entity
//! modules only describe their tables.

mod decode;
mod encode;

use crate::error::Result;
use crate::io::dxf::TagReader;
use crate::notification::NotificationCollection;
use crate::record::EntityRecord;
use crate::schema::EntitySchema;
use crate::types::{DxfVersion, GroupValue};
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

/// One group-code/value pair to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct TagDirective {
    pub code: i32,
    pub value: GroupValue,
}

impl TagDirective {
    pub fn new(code: i32, value: impl Into<GroupValue>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }
}

impl fmt::Display for TagDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}: {}", self.code, self.value)
    }
}

/// Codec for one entity type.
#[derive(Debug, Clone)]
pub struct EntityCodec {
    schema: Arc<EntitySchema>,
}

impl EntityCodec {
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Decode one entity body.
    ///
    /// The reader must be positioned after the entity-name line. Reading stops
    /// once the next `0` group code has been consumed; its value line (the
    /// next entity name) is left for the caller. Recoverable problems are
    /// reported to `notifications`.
    pub fn decode<R: BufRead>(
        &self,
        reader: &mut TagReader<R>,
        notifications: &mut NotificationCollection,
    ) -> Result<EntityRecord> {
        decode::Decoder::new(&self.schema, reader.version()).run(reader, notifications)
    }

    /// Encode `record` for `version`; the entity-name directive comes first.
    pub fn encode(&self, record: &EntityRecord, version: DxfVersion) -> Result<Vec<TagDirective>> {
        encode::encode(&self.schema, record, version)
    }
}
