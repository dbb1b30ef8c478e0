//! Slots shared by every entity and object table

use crate::record::EntityRecord;
use crate::schema::{ChainKind, Constraint, FieldSlot, WritePredicate};
use crate::types::{DxfVersion, Handle};

/// Field names of the common entity prelude.
pub mod field {
    pub const HANDLE: &str = "handle";
    pub const DICTIONARY_OWNER_SOFT: &str = "dictionary_owner_soft";
    pub const DICTIONARY_OWNER_HARD: &str = "dictionary_owner_hard";
    pub const OBJECT_OWNER_SOFT: &str = "object_owner_soft";
    pub const PAPERSPACE: &str = "paperspace";
    pub const LAYOUT_TAB_NAME: &str = "layout_tab_name";
    pub const LAYER: &str = "layer";
    pub const LINETYPE: &str = "linetype";
    pub const MATERIAL: &str = "material";
    pub const COLOR: &str = "color";
    pub const LINEWEIGHT: &str = "lineweight";
    pub const LINETYPE_SCALE: &str = "linetype_scale";
    pub const VISIBILITY: &str = "visibility";
    pub const ELEVATION: &str = "elevation";
    pub const THICKNESS: &str = "thickness";
    pub const COLOR_VALUE: &str = "color_value";
    pub const COLOR_NAME: &str = "color_name";
    pub const TRANSPARENCY: &str = "transparency";
    pub const PLOT_STYLE: &str = "plot_style";
    pub const SHADOW_MODE: &str = "shadow_mode";
}

/// Subclass marker of the common entity data
pub const ENTITY_SUBCLASS: &str = "AcDbEntity";

/// Application group holding persistent reactors
pub const REACTORS_GROUP: &str = "ACAD_REACTORS";

/// Application group holding the extension dictionary
pub const XDICTIONARY_GROUP: &str = "ACAD_XDICTIONARY";

/// How owner pointers (330) are told apart while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRule {
    /// By the enclosing `{ACAD_REACTORS` group.
    AppGroups,
    /// By position: the first 330 is the dictionary owner, the second the
    /// block-record owner, later ones are object ids.
    Positional,
}

/// Handle, reactor and extension dictionary groups, and the owner pointer.
pub(crate) fn ownership_slots(rule: OwnerRule) -> Vec<FieldSlot> {
    let dictionary_owner = FieldSlot::field(330, field::DICTIONARY_OWNER_SOFT).omit_blank();
    let dictionary_owner = match rule {
        OwnerRule::AppGroups => dictionary_owner
            .in_group(REACTORS_GROUP)
            .since(DxfVersion::R14),
        OwnerRule::Positional => dictionary_owner
            .nth(0)
            .default(Handle::NULL)
            .when(WritePredicate::Custom(dictionary_owner_position_used)),
    };
    let object_owner = FieldSlot::field(330, field::OBJECT_OWNER_SOFT)
        .omit_blank()
        .since(DxfVersion::R13);
    let object_owner = match rule {
        OwnerRule::AppGroups => object_owner,
        OwnerRule::Positional => object_owner
            .nth(1)
            .default(Handle::NULL)
            .when(WritePredicate::Custom(object_owner_position_used)),
    };
    let reactors_set = WritePredicate::FieldSet(field::DICTIONARY_OWNER_SOFT);
    let xdictionary_set = WritePredicate::FieldSet(field::DICTIONARY_OWNER_HARD);

    vec![
        FieldSlot::field(5, field::HANDLE).omit_blank(),
        FieldSlot::brace("{ACAD_REACTORS")
            .since(DxfVersion::R14)
            .when(reactors_set),
        dictionary_owner,
        FieldSlot::brace("}").since(DxfVersion::R14).when(reactors_set),
        FieldSlot::brace("{ACAD_XDICTIONARY")
            .since(DxfVersion::R14)
            .when(xdictionary_set),
        FieldSlot::field(360, field::DICTIONARY_OWNER_HARD)
            .in_group(XDICTIONARY_GROUP)
            .omit_blank()
            .since(DxfVersion::R14),
        FieldSlot::brace("}").since(DxfVersion::R14).when(xdictionary_set),
        object_owner,
    ]
}

/// A positional owner is written when set, or as a null placeholder when a
/// later 330 would otherwise shift into its position.
fn dictionary_owner_position_used(record: &EntityRecord) -> bool {
    record.is_field_set(field::DICTIONARY_OWNER_SOFT) || object_owner_position_used(record)
}

fn object_owner_position_used(record: &EntityRecord) -> bool {
    record.is_field_set(field::OBJECT_OWNER_SOFT)
        || record.object_ids().iter().any(|id| id.code == 330)
}

/// Full common entity prelude: ownership plus the `AcDbEntity` data.
pub(crate) fn entity_prelude(rule: OwnerRule) -> Vec<FieldSlot> {
    let mut slots = ownership_slots(rule);
    slots.extend([
        FieldSlot::marker(ENTITY_SUBCLASS).since(DxfVersion::R13),
        FieldSlot::field(67, field::PAPERSPACE)
            .default(0)
            .omit_default()
            .constrain(Constraint::IntRange(0, 1)),
        FieldSlot::field(410, field::LAYOUT_TAB_NAME)
            .since(DxfVersion::R2000)
            .omit_blank(),
        FieldSlot::field(8, field::LAYER).default("0"),
        FieldSlot::field(6, field::LINETYPE)
            .default("BYLAYER")
            .omit_default(),
        FieldSlot::field(347, field::MATERIAL)
            .since(DxfVersion::R2007)
            .omit_blank(),
        FieldSlot::field(62, field::COLOR)
            .default(256)
            .omit_default()
            .constrain(Constraint::IntRange(0, 256)),
        FieldSlot::field(370, field::LINEWEIGHT)
            .since(DxfVersion::R2000)
            .default(-1)
            .omit_default()
            .constrain(Constraint::IntRange(-3, 211)),
        FieldSlot::field(48, field::LINETYPE_SCALE)
            .since(DxfVersion::R13)
            .default(1.0)
            .omit_default()
            .constrain(Constraint::Positive),
        FieldSlot::field(60, field::VISIBILITY)
            .since(DxfVersion::R13)
            .default(0)
            .omit_default()
            .constrain(Constraint::IntRange(0, 1)),
        FieldSlot::field(38, field::ELEVATION)
            .until(DxfVersion::R11)
            .default(0.0)
            .omit_default(),
        FieldSlot::field(39, field::THICKNESS)
            .default(0.0)
            .omit_default(),
        FieldSlot::field(420, field::COLOR_VALUE)
            .since(DxfVersion::R2004)
            .optional(),
        FieldSlot::field(430, field::COLOR_NAME)
            .since(DxfVersion::R2004)
            .omit_blank(),
        FieldSlot::field(440, field::TRANSPARENCY)
            .since(DxfVersion::R2004)
            .optional(),
        FieldSlot::field(390, field::PLOT_STYLE)
            .since(DxfVersion::R2007)
            .omit_blank(),
        FieldSlot::field(284, field::SHADOW_MODE)
            .since(DxfVersion::R2007)
            .optional()
            .constrain(Constraint::IntRange(0, 3)),
    ]);
    slots
}

/// Proxy graphics chunks, written only when present.
pub(crate) fn graphics_data_slot() -> FieldSlot {
    FieldSlot::chain(310, ChainKind::GraphicsData)
        .in_subclass(ENTITY_SUBCLASS)
        .when(WritePredicate::ChainNotEmpty(ChainKind::GraphicsData))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntitySchema, RecordKind};

    #[test]
    fn test_prelude_tables_are_consistent() {
        for rule in [OwnerRule::AppGroups, OwnerRule::Positional] {
            EntitySchema::builder("TEST", RecordKind::Entity)
                .slots(entity_prelude(rule))
                .try_build()
                .unwrap();
        }
    }

    #[test]
    fn test_positional_owner_slots() {
        let slots = ownership_slots(OwnerRule::Positional);
        let owners: Vec<_> = slots
            .iter()
            .filter(|s| s.code == 330)
            .map(|s| (s.field_name(), s.occurrence))
            .collect();
        assert_eq!(
            owners,
            vec![
                (Some(field::DICTIONARY_OWNER_SOFT), Some(0)),
                (Some(field::OBJECT_OWNER_SOFT), Some(1)),
            ]
        );
    }
}
