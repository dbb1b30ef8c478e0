//! ACAD_PROXY_ENTITY
//!
//! Stand-in for an entity whose defining application is not loaded. The
//! proxy graphics and the original entity data are opaque binary chains;
//! object ids the original data refers to follow the entity data.
//!
//! Owner pointers are resolved by position: the first 330 is the dictionary
//! owner, the second the block-record owner, and any later 330 joins the
//! object-id chain.

use super::common::{entity_prelude, graphics_data_slot, OwnerRule};
use crate::record::EntityRecord;
use crate::schema::{ChainKind, Constraint, EntitySchema, FieldSlot, RecordKind};
use crate::types::{BinaryChunk, DxfVersion};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const ENTITY_NAME: &str = "ACAD_PROXY_ENTITY";
/// Name written by R13 and older.
pub const LEGACY_ENTITY_NAME: &str = "ACAD_ZOMBIE_ENTITY";
pub const SUBCLASS: &str = "AcDbProxyEntity";

/// Default proxy entity class id
pub const PROXY_CLASS_ID: i64 = 498;
/// Default application entity class id
pub const APPLICATION_CLASS_ID: i64 = 500;

pub mod field {
    pub const GRAPHICS_DATA_SIZE: &str = "graphics_data_size";
    pub const PROXY_CLASS_ID: &str = "proxy_class_id";
    pub const APPLICATION_CLASS_ID: &str = "application_class_id";
    pub const ENTITY_DATA_SIZE: &str = "entity_data_size";
    pub const DRAWING_FORMAT: &str = "drawing_format";
    pub const ORIGINAL_DATA_FORMAT: &str = "original_data_format";
}

static SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    Arc::new(
        EntitySchema::builder(ENTITY_NAME, RecordKind::Entity)
            .named_before(DxfVersion::R14, LEGACY_ENTITY_NAME)
            .slots(entity_prelude(OwnerRule::Positional))
            .slot(
                FieldSlot::field(92, field::GRAPHICS_DATA_SIZE)
                    .until(DxfVersion::R2007)
                    .default(0)
                    .constrain(Constraint::NonNegative),
            )
            .slot(
                FieldSlot::field(160, field::GRAPHICS_DATA_SIZE)
                    .since(DxfVersion::R2010)
                    .default(0)
                    .constrain(Constraint::NonNegative),
            )
            .slot(graphics_data_slot())
            .slot(FieldSlot::marker(SUBCLASS).since(DxfVersion::R13))
            .slot(FieldSlot::field(90, field::PROXY_CLASS_ID).default(PROXY_CLASS_ID))
            .slot(FieldSlot::field(91, field::APPLICATION_CLASS_ID).default(APPLICATION_CLASS_ID))
            .slot(
                FieldSlot::field(93, field::ENTITY_DATA_SIZE)
                    .default(0)
                    .constrain(Constraint::NonNegative),
            )
            .slot(FieldSlot::chain(310, ChainKind::EntityData).in_subclass(SUBCLASS))
            .slot(FieldSlot::chain(330, ChainKind::ObjectIds).in_subclass(SUBCLASS))
            .slot(FieldSlot::chain(340, ChainKind::ObjectIds))
            .slot(FieldSlot::chain(350, ChainKind::ObjectIds))
            .slot(FieldSlot::chain(360, ChainKind::ObjectIds))
            .slot(FieldSlot::constant(94, 0))
            .slot(
                FieldSlot::field(95, field::DRAWING_FORMAT)
                    .since(DxfVersion::R2000)
                    .default(0),
            )
            .slot(
                FieldSlot::field(70, field::ORIGINAL_DATA_FORMAT)
                    .since(DxfVersion::R2000)
                    .default(0)
                    .constrain(Constraint::IntRange(0, 1)),
            )
            .build(),
    )
});

pub fn schema() -> Arc<EntitySchema> {
    Arc::clone(&SCHEMA)
}

pub fn new_record() -> EntityRecord {
    EntityRecord::with_defaults(schema())
}

/// Replace the proxy graphics with `bytes`, split into chunks, and update
/// the size field.
pub fn set_graphics_data(record: &mut EntityRecord, bytes: &[u8]) -> crate::error::Result<()> {
    let chain = record.graphics_data_mut();
    chain.clear();
    chain.extend(BinaryChunk::split_bytes(bytes));
    record.set(field::GRAPHICS_DATA_SIZE, bytes.len() as i64)
}

/// Replace the entity data with `bytes`, split into chunks, and update the
/// size field (in bits, as the format stores it).
pub fn set_entity_data(record: &mut EntityRecord, bytes: &[u8]) -> crate::error::Result<()> {
    let chain = record.entity_data_mut();
    chain.clear();
    chain.extend(BinaryChunk::split_bytes(bytes));
    record.set(field::ENTITY_DATA_SIZE, bytes.len() as i64 * 8)
}

/// Concatenated proxy graphics bytes.
pub fn graphics_data(record: &EntityRecord) -> Vec<u8> {
    record.graphics_data().iter().flat_map(BinaryChunk::to_bytes).collect()
}

/// Concatenated entity data bytes.
pub fn entity_data(record: &EntityRecord) -> Vec<u8> {
    record.entity_data().iter().flat_map(BinaryChunk::to_bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EntityCodec;
    use crate::entities::common::field as common;
    use crate::types::Handle;

    fn encode(record: &EntityRecord, version: DxfVersion) -> Vec<(i32, String)> {
        EntityCodec::new(schema())
            .encode(record, version)
            .unwrap()
            .into_iter()
            .map(|d| (d.code, d.value.format(6)))
            .collect()
    }

    #[test]
    fn test_version_dependent_name_and_size_code() {
        let record = new_record();
        assert_eq!(encode(&record, DxfVersion::R13)[0].1, LEGACY_ENTITY_NAME);
        assert_eq!(encode(&record, DxfVersion::R14)[0].1, ENTITY_NAME);

        let r2007 = encode(&record, DxfVersion::R2007);
        assert!(r2007.iter().any(|(c, _)| *c == 92));
        assert!(r2007.iter().all(|(c, _)| *c != 160));
        let r2010 = encode(&record, DxfVersion::R2010);
        assert!(r2010.iter().any(|(c, _)| *c == 160));
        assert!(r2010.iter().all(|(c, _)| *c != 92));
    }

    #[test]
    fn test_terminator_and_formats() {
        let out = encode(&new_record(), DxfVersion::R2000);
        let tail: Vec<i32> = out.iter().rev().take(3).map(|(c, _)| *c).collect();
        assert_eq!(tail, vec![70, 95, 94]);
        assert!(out.contains(&(90, "498".to_string())));
    }

    #[test]
    fn test_binary_data_helpers() {
        let mut record = new_record();
        let bytes: Vec<u8> = (0..=255u8).collect();
        set_graphics_data(&mut record, &bytes).unwrap();
        assert_eq!(record.graphics_data().len(), 3);
        assert_eq!(graphics_data(&record), bytes);
        assert_eq!(record.get_int(field::GRAPHICS_DATA_SIZE), Some(256));

        set_entity_data(&mut record, &[0xAB, 0xCD]).unwrap();
        assert_eq!(entity_data(&record), vec![0xAB, 0xCD]);
        assert_eq!(record.get_int(field::ENTITY_DATA_SIZE), Some(16));
    }

    #[test]
    fn test_owner_pointers_written_in_prelude() {
        let mut record = new_record();
        record.set(common::HANDLE, Handle::new(0x1a)).unwrap();
        record.set(common::DICTIONARY_OWNER_SOFT, Handle::new(0x20)).unwrap();
        record.set(common::OBJECT_OWNER_SOFT, Handle::new(0x1f)).unwrap();
        let out = encode(&record, DxfVersion::R2000);
        let codes: Vec<i32> = out.iter().take(7).map(|(c, _)| *c).collect();
        assert_eq!(codes, vec![0, 5, 102, 330, 102, 330, 100]);
        assert_eq!(out[3].1, "20");
        assert_eq!(out[5].1, "1f");
    }
}
