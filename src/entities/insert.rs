//! INSERT entity (block reference)
//!
//! Places an instance of a block definition, optionally as a rectangular
//! array. Placement values are carried as plain fields; nothing here applies
//! them.

use super::common::{entity_prelude, OwnerRule};
use crate::error::Result;
use crate::record::EntityRecord;
use crate::schema::{Constraint, EntitySchema, FieldSlot, RecordKind};
use crate::types::DxfVersion;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const ENTITY_NAME: &str = "INSERT";
pub const SUBCLASS: &str = "AcDbBlockReference";

/// Field names of the `AcDbBlockReference` part.
pub mod field {
    pub const ATTRIBUTES_FOLLOW: &str = "attributes_follow";
    pub const BLOCK_NAME: &str = "block_name";
    pub const INSERT_X: &str = "insert_x";
    pub const INSERT_Y: &str = "insert_y";
    pub const INSERT_Z: &str = "insert_z";
    pub const X_SCALE: &str = "x_scale";
    pub const Y_SCALE: &str = "y_scale";
    pub const Z_SCALE: &str = "z_scale";
    pub const ROTATION: &str = "rotation";
    pub const COLUMN_COUNT: &str = "column_count";
    pub const ROW_COUNT: &str = "row_count";
    pub const COLUMN_SPACING: &str = "column_spacing";
    pub const ROW_SPACING: &str = "row_spacing";
    pub const EXTRUSION_X: &str = "extrusion_x";
    pub const EXTRUSION_Y: &str = "extrusion_y";
    pub const EXTRUSION_Z: &str = "extrusion_z";
}

static SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    let array_size = Constraint::IntRange(0, 32767);
    Arc::new(
        EntitySchema::builder(ENTITY_NAME, RecordKind::Entity)
            .slots(entity_prelude(OwnerRule::AppGroups))
            .slot(FieldSlot::marker(SUBCLASS).since(DxfVersion::R13))
            .slot(
                FieldSlot::field(66, field::ATTRIBUTES_FOLLOW)
                    .default(0)
                    .omit_default()
                    .constrain(Constraint::IntRange(0, 1)),
            )
            .slot(FieldSlot::field(2, field::BLOCK_NAME))
            .slot(FieldSlot::field(10, field::INSERT_X).default(0.0))
            .slot(FieldSlot::field(20, field::INSERT_Y).default(0.0))
            .slot(FieldSlot::field(30, field::INSERT_Z).default(0.0))
            .slot(FieldSlot::field(41, field::X_SCALE).default(1.0).omit_default())
            .slot(FieldSlot::field(42, field::Y_SCALE).default(1.0).omit_default())
            .slot(FieldSlot::field(43, field::Z_SCALE).default(1.0).omit_default())
            .slot(FieldSlot::field(50, field::ROTATION).default(0.0).omit_default())
            .slot(
                FieldSlot::field(70, field::COLUMN_COUNT)
                    .default(1)
                    .omit_default()
                    .constrain(array_size),
            )
            .slot(
                FieldSlot::field(71, field::ROW_COUNT)
                    .default(1)
                    .omit_default()
                    .constrain(array_size),
            )
            .slot(FieldSlot::field(44, field::COLUMN_SPACING).default(0.0).omit_default())
            .slot(FieldSlot::field(45, field::ROW_SPACING).default(0.0).omit_default())
            .slot(
                FieldSlot::field(210, field::EXTRUSION_X)
                    .since(DxfVersion::R12)
                    .default(0.0)
                    .omit_default(),
            )
            .slot(
                FieldSlot::field(220, field::EXTRUSION_Y)
                    .since(DxfVersion::R12)
                    .default(0.0)
                    .omit_default(),
            )
            .slot(
                FieldSlot::field(230, field::EXTRUSION_Z)
                    .since(DxfVersion::R12)
                    .default(1.0)
                    .omit_default(),
            )
            .build(),
    )
});

/// The INSERT field table.
pub fn schema() -> Arc<EntitySchema> {
    Arc::clone(&SCHEMA)
}

/// An INSERT with every default filled in.
pub fn new_record() -> EntityRecord {
    EntityRecord::with_defaults(schema())
}

/// An INSERT of `block_name` at `point`.
pub fn new(block_name: &str, point: [f64; 3]) -> Result<EntityRecord> {
    let mut record = new_record();
    record.set(field::BLOCK_NAME, block_name)?;
    record.set(field::INSERT_X, point[0])?;
    record.set(field::INSERT_Y, point[1])?;
    record.set(field::INSERT_Z, point[2])?;
    Ok(record)
}
