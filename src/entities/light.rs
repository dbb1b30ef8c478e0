//! LIGHT entity (AutoCAD 2007+)

use super::common::{entity_prelude, OwnerRule};
use crate::record::EntityRecord;
use crate::schema::{Constraint, EntitySchema, FieldSlot, RecordKind};
use crate::types::DxfVersion;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const ENTITY_NAME: &str = "LIGHT";
pub const SUBCLASS: &str = "AcDbLight";

pub mod field {
    pub const VERSION: &str = "light_version";
    pub const NAME: &str = "light_name";
    pub const LIGHT_TYPE: &str = "light_type";
    pub const STATUS: &str = "status";
    pub const PLOT_GLYPH: &str = "plot_glyph";
    pub const INTENSITY: &str = "intensity";
    pub const POSITION_X: &str = "position_x";
    pub const POSITION_Y: &str = "position_y";
    pub const POSITION_Z: &str = "position_z";
    pub const TARGET_X: &str = "target_x";
    pub const TARGET_Y: &str = "target_y";
    pub const TARGET_Z: &str = "target_z";
    pub const ATTENUATION_TYPE: &str = "attenuation_type";
    pub const USE_ATTENUATION_LIMITS: &str = "use_attenuation_limits";
    pub const ATTENUATION_START_LIMIT: &str = "attenuation_start_limit";
    pub const ATTENUATION_END_LIMIT: &str = "attenuation_end_limit";
    pub const HOTSPOT_ANGLE: &str = "hotspot_angle";
    pub const FALLOFF_ANGLE: &str = "falloff_angle";
    pub const CAST_SHADOWS: &str = "cast_shadows";
    pub const SHADOW_TYPE: &str = "shadow_type";
    pub const SHADOW_MAP_SIZE: &str = "shadow_map_size";
    pub const SHADOW_MAP_SOFTNESS: &str = "shadow_map_softness";
}

/// Light type (group 70)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum LightType {
    Distant = 1,
    Point = 2,
    Spot = 3,
}

impl LightType {
    pub fn from_code(value: i64) -> Option<Self> {
        match value {
            1 => Some(LightType::Distant),
            2 => Some(LightType::Point),
            3 => Some(LightType::Spot),
            _ => None,
        }
    }
}

static SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    let flag = Constraint::IntRange(0, 1);
    let light_slots = [
        FieldSlot::marker(SUBCLASS),
        FieldSlot::field(90, field::VERSION).default(1),
        FieldSlot::field(1, field::NAME).default(""),
        FieldSlot::field(70, field::LIGHT_TYPE)
            .default(LightType::Point as i64)
            .constrain(Constraint::IntRange(1, 3)),
        FieldSlot::field(290, field::STATUS).default(1).constrain(flag),
        FieldSlot::field(291, field::PLOT_GLYPH).default(0).constrain(flag),
        FieldSlot::field(40, field::INTENSITY)
            .default(1.0)
            .constrain(Constraint::NonNegative),
        FieldSlot::field(10, field::POSITION_X).default(0.0),
        FieldSlot::field(20, field::POSITION_Y).default(0.0),
        FieldSlot::field(30, field::POSITION_Z).default(0.0),
        FieldSlot::field(11, field::TARGET_X).default(0.0),
        FieldSlot::field(21, field::TARGET_Y).default(0.0),
        FieldSlot::field(31, field::TARGET_Z).default(0.0),
        FieldSlot::field(72, field::ATTENUATION_TYPE)
            .default(0)
            .constrain(Constraint::IntRange(0, 2)),
        FieldSlot::field(292, field::USE_ATTENUATION_LIMITS)
            .default(0)
            .constrain(flag),
        FieldSlot::field(41, field::ATTENUATION_START_LIMIT).default(0.0),
        FieldSlot::field(42, field::ATTENUATION_END_LIMIT).default(0.0),
        FieldSlot::field(50, field::HOTSPOT_ANGLE).default(0.0),
        FieldSlot::field(51, field::FALLOFF_ANGLE).default(0.0),
        FieldSlot::field(293, field::CAST_SHADOWS).default(1).constrain(flag),
        FieldSlot::field(73, field::SHADOW_TYPE).default(0).constrain(flag),
        FieldSlot::field(91, field::SHADOW_MAP_SIZE)
            .default(256)
            .constrain(Constraint::NonNegative),
        FieldSlot::field(280, field::SHADOW_MAP_SOFTNESS).default(1),
    ];
    Arc::new(
        EntitySchema::builder(ENTITY_NAME, RecordKind::Entity)
            .slots(entity_prelude(OwnerRule::AppGroups))
            .slots(light_slots.into_iter().map(|s| s.since(DxfVersion::R2007)))
            .build(),
    )
});

pub fn schema() -> Arc<EntitySchema> {
    Arc::clone(&SCHEMA)
}

pub fn new_record() -> EntityRecord {
    EntityRecord::with_defaults(schema())
}
