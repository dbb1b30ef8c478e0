//! LTYPE table entry
//!
//! A line type pattern is a repeating element group: every dash length (49)
//! starts an element, and the members that follow it (74, 75, 340, 46, 50,
//! 44, 45, 9) describe an embedded shape or text for that element.

use crate::entities::common::{ownership_slots, OwnerRule};
use crate::error::Result;
use crate::record::EntityRecord;
use crate::schema::{Constraint, EntitySchema, FieldSlot, RecordKind, WritePredicate};
use crate::types::{DxfVersion, GroupValue, Handle};
use bitflags::bitflags;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const TABLE_NAME: &str = "LTYPE";
pub const RECORD_SUBCLASS: &str = "AcDbSymbolTableRecord";
pub const SUBCLASS: &str = "AcDbLinetypeTableRecord";

/// Alignment code; `A` is the only value the format defines.
pub const ALIGNMENT_A: i64 = 'A' as i64;

pub mod field {
    pub const NAME: &str = "name";
    pub const FLAGS: &str = "flags";
    pub const DESCRIPTION: &str = "description";
    pub const ALIGNMENT: &str = "alignment";
    pub const ELEMENT_COUNT: &str = "element_count";
    pub const PATTERN_LENGTH: &str = "pattern_length";
    pub const DASH_LENGTH: &str = "dash_length";
    pub const ELEMENT_FLAGS: &str = "element_flags";
    pub const SHAPE_NUMBER: &str = "shape_number";
    pub const STYLE: &str = "style";
    pub const SCALE: &str = "scale";
    pub const ROTATION: &str = "rotation";
    pub const OFFSET_X: &str = "offset_x";
    pub const OFFSET_Y: &str = "offset_y";
    pub const TEXT: &str = "text";
}

bitflags! {
    /// Standard symbol table flags (group 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineTypeFlags: i64 {
        /// Entry depends on an external reference.
        const XREF_DEPENDENT = 16;
        /// Xref-dependent entry whose xref resolved.
        const XREF_RESOLVED = 32;
        /// Entry was referenced by an entity on the last edit.
        const REFERENCED = 64;
    }
}

bitflags! {
    /// Complex line type element flags (group 74)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineTypeElementFlags: i64 {
        /// Rotation is absolute rather than relative to the line.
        const ABSOLUTE_ROTATION = 1;
        /// The element embeds a text string.
        const TEXT = 2;
        /// The element embeds a shape.
        const SHAPE = 4;
    }
}

/// One pattern element (dash, dot or space) with its optional embedded
/// shape or text.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTypeElement {
    /// Positive for a dash, negative for a space, zero for a dot
    pub length: f64,
    pub flags: LineTypeElementFlags,
    pub shape_number: i64,
    /// Text style (or shape file) reference
    pub style: Handle,
    pub scale: f64,
    pub rotation: f64,
    pub offset: (f64, f64),
    pub text: String,
}

impl LineTypeElement {
    /// A plain element of `length`.
    pub fn new(length: f64) -> Self {
        Self {
            length,
            flags: LineTypeElementFlags::empty(),
            shape_number: 0,
            style: Handle::NULL,
            scale: 1.0,
            rotation: 0.0,
            offset: (0.0, 0.0),
            text: String::new(),
        }
    }

    pub fn dash(length: f64) -> Self {
        Self::new(length.abs())
    }

    pub fn space(length: f64) -> Self {
        Self::new(-length.abs())
    }

    pub fn dot() -> Self {
        Self::new(0.0)
    }

    /// Embed `text` drawn with `style`.
    pub fn with_text(mut self, text: impl Into<String>, style: Handle) -> Self {
        self.flags |= LineTypeElementFlags::TEXT;
        self.text = text.into();
        self.style = style;
        self
    }

    /// Embed shape `shape_number` from the shape file `style`.
    pub fn with_shape(mut self, shape_number: i64, style: Handle) -> Self {
        self.flags |= LineTypeElementFlags::SHAPE;
        self.shape_number = shape_number;
        self.style = style;
        self
    }
}

static SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    Arc::new(
        EntitySchema::builder(TABLE_NAME, RecordKind::TableEntry(TABLE_NAME))
            .slots(ownership_slots(OwnerRule::AppGroups))
            .slot(FieldSlot::marker(RECORD_SUBCLASS).since(DxfVersion::R13))
            .slot(FieldSlot::marker(SUBCLASS).since(DxfVersion::R13))
            .slot(FieldSlot::field(2, field::NAME))
            .slot(FieldSlot::field(70, field::FLAGS).default(0))
            .slot(FieldSlot::field(3, field::DESCRIPTION).default(""))
            .slot(
                FieldSlot::field(72, field::ALIGNMENT)
                    .default(ALIGNMENT_A)
                    .constrain(Constraint::IntRange(ALIGNMENT_A, ALIGNMENT_A)),
            )
            .slot(
                FieldSlot::field(73, field::ELEMENT_COUNT)
                    .default(0)
                    .constrain(Constraint::NonNegative),
            )
            .slot(
                FieldSlot::field(40, field::PATTERN_LENGTH)
                    .default(0.0)
                    .constrain(Constraint::NonNegative),
            )
            .slot(FieldSlot::field(49, field::DASH_LENGTH).many())
            .slot(
                FieldSlot::field(74, field::ELEMENT_FLAGS)
                    .since(DxfVersion::R13)
                    .default(0)
                    .element_of(field::DASH_LENGTH),
            )
            .slot(
                FieldSlot::field(75, field::SHAPE_NUMBER)
                    .default(0)
                    .when(WritePredicate::NotDefault)
                    .element_of(field::DASH_LENGTH),
            )
            .slot(
                FieldSlot::field(340, field::STYLE)
                    .when(WritePredicate::NotBlank)
                    .element_of(field::DASH_LENGTH),
            )
            .slot(
                FieldSlot::field(46, field::SCALE)
                    .default(1.0)
                    .when(WritePredicate::NotDefault)
                    .element_of(field::DASH_LENGTH),
            )
            .slot(
                FieldSlot::field(50, field::ROTATION)
                    .default(0.0)
                    .when(WritePredicate::NotDefault)
                    .element_of(field::DASH_LENGTH),
            )
            .slot(
                FieldSlot::field(44, field::OFFSET_X)
                    .default(0.0)
                    .when(WritePredicate::NotDefault)
                    .element_of(field::DASH_LENGTH),
            )
            .slot(
                FieldSlot::field(45, field::OFFSET_Y)
                    .default(0.0)
                    .when(WritePredicate::NotDefault)
                    .element_of(field::DASH_LENGTH),
            )
            .slot(
                FieldSlot::field(9, field::TEXT)
                    .default("")
                    .when(WritePredicate::NotBlank)
                    .element_of(field::DASH_LENGTH),
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

/// A line type entry named `name`.
pub fn new(name: &str) -> Result<EntityRecord> {
    let mut record = new_record();
    record.set(field::NAME, name)?;
    Ok(record)
}

/// The `Continuous` line type (no pattern).
pub fn continuous() -> Result<EntityRecord> {
    let mut record = new("Continuous")?;
    record.set(field::DESCRIPTION, "Solid line")?;
    Ok(record)
}

/// Append a pattern element and keep the element count and total pattern
/// length in step.
pub fn push_element(record: &mut EntityRecord, element: &LineTypeElement) -> Result<()> {
    record.push(field::DASH_LENGTH, element.length)?;
    let index = record.element_count(field::DASH_LENGTH) - 1;
    record.set_element(field::ELEMENT_FLAGS, index, element.flags.bits())?;
    record.set_element(field::SHAPE_NUMBER, index, element.shape_number)?;
    record.set_element(field::STYLE, index, element.style)?;
    record.set_element(field::SCALE, index, element.scale)?;
    record.set_element(field::ROTATION, index, element.rotation)?;
    record.set_element(field::OFFSET_X, index, element.offset.0)?;
    record.set_element(field::OFFSET_Y, index, element.offset.1)?;
    record.set_element(field::TEXT, index, element.text.as_str())?;

    let total: f64 = record
        .get_list(field::DASH_LENGTH)
        .iter()
        .filter_map(GroupValue::as_real)
        .map(f64::abs)
        .sum();
    record.set(field::ELEMENT_COUNT, (index + 1) as i64)?;
    record.set(field::PATTERN_LENGTH, total)
}

/// Pattern elements as typed values.
pub fn elements(record: &EntityRecord) -> Vec<LineTypeElement> {
    let member = |name: &str, index: usize| record.get_list(name).get(index).cloned();
    record
        .get_list(field::DASH_LENGTH)
        .iter()
        .enumerate()
        .map(|(i, length)| LineTypeElement {
            length: length.as_real().unwrap_or_default(),
            flags: LineTypeElementFlags::from_bits_truncate(
                member(field::ELEMENT_FLAGS, i)
                    .and_then(|v| v.as_int())
                    .unwrap_or_default(),
            ),
            shape_number: member(field::SHAPE_NUMBER, i)
                .and_then(|v| v.as_int())
                .unwrap_or_default(),
            style: member(field::STYLE, i)
                .and_then(|v| v.as_handle())
                .unwrap_or_default(),
            scale: member(field::SCALE, i)
                .and_then(|v| v.as_real())
                .unwrap_or(1.0),
            rotation: member(field::ROTATION, i)
                .and_then(|v| v.as_real())
                .unwrap_or_default(),
            offset: (
                member(field::OFFSET_X, i)
                    .and_then(|v| v.as_real())
                    .unwrap_or_default(),
                member(field::OFFSET_Y, i)
                    .and_then(|v| v.as_real())
                    .unwrap_or_default(),
            ),
            text: member(field::TEXT, i)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
        })
        .collect()
}

/// Standard flags of an entry.
pub fn flags(record: &EntityRecord) -> LineTypeFlags {
    LineTypeFlags::from_bits_truncate(record.get_int(field::FLAGS).unwrap_or_default())
}
