//! Tag-stream decoding

use crate::error::{DxfError, Result};
use crate::io::dxf::TagReader;
use crate::notification::{NotificationCollection, NotificationType};
use crate::record::EntityRecord;
use crate::schema::{
    ChainKind, EntitySchema, FieldSlot, Multiplicity, SlotTarget, WritePredicate,
};
use crate::types::{DxfVersion, GroupValue, ObjectIdRef};
use ahash::{AHashMap, AHashSet};
use std::cmp::Reverse;
use std::io::BufRead;
use std::sync::Arc;

/// Decoder states. `Sentinel` and `Error` are terminal.
enum State {
    Scanning,
    Dispatched(i32),
    Sentinel,
    Error(DxfError),
}

/// Per-entity decode cursor.
pub(super) struct Decoder<'s> {
    schema: &'s EntitySchema,
    version: DxfVersion,
    record: EntityRecord,
    occurrences: AHashMap<i32, usize>,
    subclass: Option<String>,
    group: Option<String>,
    assigned: AHashSet<&'static str>,
    /// Element members already set in the current element of their group.
    element_assigned: AHashSet<&'static str>,
}

impl<'s> Decoder<'s> {
    pub(super) fn new(schema: &'s Arc<EntitySchema>, version: DxfVersion) -> Self {
        Self {
            schema: &**schema,
            version,
            record: EntityRecord::with_defaults(Arc::clone(schema)),
            occurrences: AHashMap::new(),
            subclass: None,
            group: None,
            assigned: AHashSet::new(),
            element_assigned: AHashSet::new(),
        }
    }

    pub(super) fn run<R: BufRead>(
        mut self,
        reader: &mut TagReader<R>,
        notifications: &mut NotificationCollection,
    ) -> Result<EntityRecord> {
        if self.schema.is_empty() {
            return Err(DxfError::InvariantViolation(format!(
                "cannot decode {} with an empty schema",
                self.schema.name()
            )));
        }

        let mut state = State::Scanning;
        loop {
            state = match state {
                State::Scanning => match reader.next_group_code() {
                    Ok(code) if reader.is_sentinel(code) => State::Sentinel,
                    Ok(code) => State::Dispatched(code),
                    Err(e) => State::Error(e),
                },
                State::Dispatched(code) => match self.dispatch(code, reader, notifications) {
                    Ok(()) => State::Scanning,
                    Err(e) => State::Error(e),
                },
                State::Sentinel => {
                    self.report_missing(reader.line_number(), notifications);
                    return Ok(self.record);
                }
                State::Error(e) => return Err(e),
            };
        }
    }

    fn dispatch<R: BufRead>(
        &mut self,
        code: i32,
        reader: &mut TagReader<R>,
        notifications: &mut NotificationCollection,
    ) -> Result<()> {
        let occurrence = {
            let count = self.occurrences.entry(code).or_insert(0);
            *count += 1;
            *count - 1
        };

        let Some(slot) = self.resolve(code, occurrence) else {
            notifications.notify_at(
                NotificationType::UnknownTag,
                reader.line_number(),
                code,
                format!("{}: unknown group code {} skipped", self.schema.name(), code),
            );
            return reader.skip_value();
        };

        let value = match reader.read_value(slot.kind) {
            Ok(value) => value,
            Err(DxfError::MalformedValue { line, kind, text, .. }) => {
                notifications.notify_at(
                    NotificationType::MalformedValue,
                    line,
                    code,
                    format!(
                        "{}: {:?} is not a valid {} value; field keeps its default",
                        self.schema.name(),
                        text,
                        kind
                    ),
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let line = reader.line_number();

        if !slot.applies_to(self.version) {
            notifications.notify_at(
                NotificationType::VersionMismatch,
                line,
                code,
                format!(
                    "{}: group code {} is not expected in {}; value kept",
                    self.schema.name(),
                    code,
                    self.version
                ),
            );
        }
        if let Some(constraint) = slot.constraint {
            if !constraint.accepts(&value) {
                notifications.notify_at(
                    NotificationType::OutOfRange,
                    line,
                    code,
                    format!(
                        "{}: {} out of range for group code {}; value kept",
                        self.schema.name(),
                        value,
                        code
                    ),
                );
            }
        }

        match &slot.target {
            SlotTarget::Constant(_) => self.apply_constant(code, value, line, notifications),
            SlotTarget::Field(name) => self.apply_field(slot, *name, value, line, notifications),
            SlotTarget::Chain(chain) => self.apply_chain(code, *chain, value),
        }
        Ok(())
    }

    /// Warn about required fields the body never supplied; such a record is
    /// kept but cannot be encoded until they are set.
    fn report_missing(&self, line: usize, notifications: &mut NotificationCollection) {
        for slot in self.schema.slots() {
            let Some(name) = slot.field_name() else {
                continue;
            };
            let required = slot.multiplicity == Multiplicity::One
                && slot.default.is_none()
                && matches!(slot.write, WritePredicate::Always)
                && slot.applies_to(self.version);
            if required && self.record.get(name).is_none() {
                notifications.notify_at(
                    NotificationType::Warning,
                    line,
                    slot.code,
                    format!(
                        "{}: required {} (group code {}) is missing",
                        self.schema.name(),
                        name,
                        slot.code
                    ),
                );
            }
        }
    }

    /// Pick the slot for the `occurrence`-th appearance of `code`.
    ///
    /// Positional and application-group restrictions are hard filters.
    /// Subclass scope and version gating only rank candidates, so a value
    /// found outside its expected place still lands in a field.
    fn resolve(&self, code: i32, occurrence: usize) -> Option<&'s FieldSlot> {
        let schema = self.schema;
        schema
            .slots_for_code(code)
            .iter()
            .copied()
            .filter(|&i| {
                let slot = schema.slot(i);
                slot.occurrence.map_or(true, |n| n == occurrence) && self.group_matches(slot)
            })
            .max_by_key(|&i| {
                let slot = schema.slot(i);
                (
                    self.subclass_matches(slot),
                    slot.group.is_some(),
                    slot.applies_to(self.version),
                    slot.occurrence.is_some(),
                    slot.subclass.is_some(),
                    Reverse(i),
                )
            })
            .map(|i| schema.slot(i))
    }

    fn group_matches(&self, slot: &FieldSlot) -> bool {
        match (slot.group, &self.group) {
            (None, _) => true,
            (Some(wanted), Some(open)) => wanted == open.as_str(),
            (Some(_), None) => false,
        }
    }

    /// Scoping is not enforced before the first subclass marker.
    fn subclass_matches(&self, slot: &FieldSlot) -> bool {
        match (slot.subclass, &self.subclass) {
            (Some(wanted), Some(current)) => wanted == current.as_str(),
            _ => true,
        }
    }

    fn apply_constant(
        &mut self,
        code: i32,
        value: GroupValue,
        line: usize,
        notifications: &mut NotificationCollection,
    ) {
        let text = value.as_str().unwrap_or_default();
        match code {
            100 => {
                if !self.schema.subclasses().any(|s| s == text) {
                    notifications.notify_at(
                        NotificationType::SubclassMismatch,
                        line,
                        code,
                        format!("{}: unexpected subclass marker {}", self.schema.name(), text),
                    );
                }
                self.subclass = Some(text.to_string());
            }
            102 => {
                if let Some(name) = text.strip_prefix('{') {
                    self.group = Some(name.to_string());
                } else if text == "}" {
                    self.group = None;
                }
            }
            _ => {
                if !self.schema.constants_for(code).any(|c| *c == value) {
                    notifications.notify_at(
                        NotificationType::Warning,
                        line,
                        code,
                        format!(
                            "{}: unexpected value {} for fixed group code {}",
                            self.schema.name(),
                            value,
                            code
                        ),
                    );
                }
            }
        }
    }

    fn apply_field(
        &mut self,
        slot: &FieldSlot,
        name: &'static str,
        value: GroupValue,
        line: usize,
        notifications: &mut NotificationCollection,
    ) {
        if let Some(leader) = slot.element_of {
            if self.record.element_count(leader) == 0 || self.element_assigned.contains(name) {
                notifications.notify_at(
                    NotificationType::Warning,
                    line,
                    slot.code,
                    format!(
                        "{}: {} outside of a {} element; dropped",
                        self.schema.name(),
                        name,
                        leader
                    ),
                );
                return;
            }
            self.record.put_last_element(name, value);
            self.element_assigned.insert(name);
        } else if slot.multiplicity == Multiplicity::Many {
            self.record.push_unchecked(name, value);
            for member in self.schema.element_members(name) {
                if let Some(member) = member.field_name() {
                    self.element_assigned.remove(member);
                }
            }
        } else {
            // A null handle only holds a positional owner's place
            if slot.occurrence.is_some() && value.is_blank() {
                return;
            }
            if !self.assigned.insert(name) {
                notifications.notify_at(
                    NotificationType::Warning,
                    line,
                    slot.code,
                    format!(
                        "{}: repeated {}; last value kept",
                        self.schema.name(),
                        name
                    ),
                );
            }
            self.record.put(name, value);
        }
    }

    fn apply_chain(&mut self, code: i32, chain: ChainKind, value: GroupValue) {
        match (chain, value) {
            (ChainKind::GraphicsData, GroupValue::Chunk(chunk)) => {
                self.record.graphics_data_mut().append(chunk)
            }
            (ChainKind::EntityData, GroupValue::Chunk(chunk)) => {
                self.record.entity_data_mut().append(chunk)
            }
            (ChainKind::ObjectIds, GroupValue::HexId(handle)) => {
                self.record.object_ids_mut().append(ObjectIdRef::new(code, handle))
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EntityCodec;
    use crate::schema::{Constraint, RecordKind};
    use crate::types::{BinaryChunk, Handle};
    use std::io::Cursor;

    fn schema() -> Arc<EntitySchema> {
        Arc::new(
            EntitySchema::builder("THING", RecordKind::Entity)
                .slot(FieldSlot::field(5, "handle").omit_blank())
                .slot(FieldSlot::brace("{ACAD_REACTORS").since(DxfVersion::R14))
                .slot(
                    FieldSlot::field(330, "reactor")
                        .in_group("ACAD_REACTORS")
                        .omit_blank()
                        .since(DxfVersion::R14),
                )
                .slot(FieldSlot::brace("}").since(DxfVersion::R14))
                .slot(FieldSlot::field(330, "owner").omit_blank())
                .slot(FieldSlot::marker("AcDbEntity").since(DxfVersion::R13))
                .slot(FieldSlot::field(8, "layer").default("0"))
                .slot(
                    FieldSlot::field(62, "color")
                        .default(256)
                        .omit_default()
                        .constrain(Constraint::IntRange(0, 256)),
                )
                .slot(FieldSlot::field(370, "lineweight").since(DxfVersion::R2000).optional())
                .slot(FieldSlot::chain(310, ChainKind::GraphicsData).in_subclass("AcDbEntity"))
                .slot(FieldSlot::marker("AcDbThing").since(DxfVersion::R13))
                .slot(FieldSlot::chain(310, ChainKind::EntityData).in_subclass("AcDbThing"))
                .slot(FieldSlot::field(49, "dash").many())
                .slot(FieldSlot::field(74, "dash_flags").default(0).element_of("dash"))
                .build(),
        )
    }

    fn decode(text: &str, version: DxfVersion) -> (Result<EntityRecord>, NotificationCollection) {
        let mut reader = TagReader::new(Cursor::new(text.as_bytes())).with_version(version);
        let mut notes = NotificationCollection::new();
        let result = EntityCodec::new(schema()).decode(&mut reader, &mut notes);
        (result, notes)
    }

    #[test]
    fn test_unknown_tag_is_skipped() {
        let (record, notes) = decode("9999\nvalue\n  8\nMyLayer\n  0\nNEXTENTITY\n", DxfVersion::R2000);
        let record = record.unwrap();
        assert_eq!(record.get_str("layer"), Some("MyLayer"));
        assert_eq!(notes.len(), 1);
        assert_eq!(notes.of_type(NotificationType::UnknownTag)[0].code, Some(9999));
    }

    #[test]
    fn test_malformed_value_keeps_default() {
        let (record, notes) = decode(" 62\nred\n  8\nL1\n  0\nEOF\n", DxfVersion::R2000);
        let record = record.unwrap();
        assert_eq!(record.get_int("color"), Some(256));
        assert_eq!(record.get_str("layer"), Some("L1"));
        assert!(notes.has_type(NotificationType::MalformedValue));
    }

    #[test]
    fn test_group_scoping_and_subclass_scoping() {
        let text = "  5\n1A\n102\n{ACAD_REACTORS\n330\n1F\n102\n}\n330\n2\n\
                    100\nAcDbEntity\n310\nAA\n100\nAcDbThing\n310\nBB\n310\nCC\n  0\n";
        let (record, notes) = decode(text, DxfVersion::R2000);
        let record = record.unwrap();
        assert!(notes.is_empty(), "{:?}", notes);
        assert_eq!(record.get("handle"), Some(&GroupValue::HexId(Handle::new(0x1a))));
        assert_eq!(record.get("reactor"), Some(&GroupValue::HexId(Handle::new(0x1f))));
        assert_eq!(record.get("owner"), Some(&GroupValue::HexId(Handle::new(2))));
        assert_eq!(record.graphics_data().len(), 1);
        let data: Vec<_> = record.entity_data().iter().map(BinaryChunk::as_str).collect();
        assert_eq!(data, ["BB", "CC"]);
    }

    #[test]
    fn test_version_mismatch_keeps_value() {
        let (record, notes) = decode("370\n25\n  0\n", DxfVersion::R14);
        assert_eq!(record.unwrap().get_int("lineweight"), Some(25));
        assert_eq!(notes.of_type(NotificationType::VersionMismatch).len(), 1);

        let (_, notes) = decode("370\n25\n  0\n", DxfVersion::Unknown);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_out_of_range_and_subclass_mismatch_are_diagnostics() {
        let (record, notes) = decode(" 62\n999\n100\nAcDbOther\n  0\n", DxfVersion::R2000);
        assert_eq!(record.unwrap().get_int("color"), Some(999));
        assert!(notes.has_type(NotificationType::OutOfRange));
        assert!(notes.has_type(NotificationType::SubclassMismatch));
    }

    #[test]
    fn test_element_group_padding() {
        let text = " 49\n0.5\n 74\n2\n 49\n-0.25\n 49\n0.0\n 74\n4\n 74\n5\n  0\n";
        let (record, notes) = decode(text, DxfVersion::R2000);
        let record = record.unwrap();
        assert_eq!(record.element_count("dash"), 3);
        assert_eq!(
            record.get_list("dash_flags"),
            &[GroupValue::Integer(2), GroupValue::Integer(0), GroupValue::Integer(4)]
        );
        // the second 74 in the last element is dropped
        assert_eq!(notes.of_type(NotificationType::Warning).len(), 1);
    }

    #[test]
    fn test_end_of_stream_mid_entity_is_fatal() {
        let (result, _) = decode("  8\nL1\n", DxfVersion::R2000);
        assert!(matches!(result, Err(DxfError::EndOfStream { .. })));

        let (result, _) = decode("  8\n", DxfVersion::R2000);
        assert!(matches!(result, Err(DxfError::UnexpectedEof { .. })));

        let (result, _) = decode("layer\nL1\n  0\n", DxfVersion::R2000);
        assert!(matches!(result, Err(DxfError::InvalidGroupCode { .. })));
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let required = Arc::new(
            EntitySchema::builder("NAMED", RecordKind::Entity)
                .slot(FieldSlot::field(8, "layer").default("0"))
                .slot(FieldSlot::field(2, "name"))
                .build(),
        );
        let codec = EntityCodec::new(required);

        let mut reader = TagReader::new(Cursor::new("  8\nL1\n  0\n".as_bytes()));
        let mut notes = NotificationCollection::new();
        let record = codec.decode(&mut reader, &mut notes).unwrap();
        assert!(record.get("name").is_none());
        let warnings = notes.of_type(NotificationType::Warning);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, Some(2));
        assert!(matches!(
            codec.encode(&record, DxfVersion::R2000),
            Err(DxfError::MissingField(_))
        ));

        let mut reader = TagReader::new(Cursor::new("  2\nN\n  0\n".as_bytes()));
        let mut notes = NotificationCollection::new();
        codec.decode(&mut reader, &mut notes).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_empty_schema_rejected() {
        let empty = Arc::new(EntitySchema::builder("EMPTY", RecordKind::Entity).build());
        let mut reader = TagReader::new(Cursor::new("  0\n".as_bytes()));
        let mut notes = NotificationCollection::new();
        let result = EntityCodec::new(empty).decode(&mut reader, &mut notes);
        assert!(matches!(result, Err(DxfError::InvariantViolation(_))));
    }
}
