//! SPATIAL_INDEX object
//!
//! Only the index timestamp is exposed; the index content itself is rebuilt
//! by the application and never stored in DXF.

use crate::entities::common::{ownership_slots, OwnerRule};
use crate::record::EntityRecord;
use crate::schema::{EntitySchema, FieldSlot, RecordKind};
use crate::types::DxfVersion;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const OBJECT_NAME: &str = "SPATIAL_INDEX";
pub const INDEX_SUBCLASS: &str = "AcDbIndex";
pub const SUBCLASS: &str = "AcDbSpatialIndex";

pub mod field {
    /// Julian date of the last index update
    pub const TIMESTAMP: &str = "timestamp";
}

static SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    Arc::new(
        EntitySchema::builder(OBJECT_NAME, RecordKind::Object)
            .slots(ownership_slots(OwnerRule::AppGroups))
            .slot(FieldSlot::marker(INDEX_SUBCLASS).since(DxfVersion::R14))
            .slot(FieldSlot::field(40, field::TIMESTAMP).default(0.0))
            .slot(FieldSlot::marker(SUBCLASS).since(DxfVersion::R14))
            .build(),
    )
});

pub fn schema() -> Arc<EntitySchema> {
    Arc::clone(&SCHEMA)
}

pub fn new_record() -> EntityRecord {
    EntityRecord::with_defaults(schema())
}
