//! Directive generation

use super::TagDirective;
use crate::error::{DxfError, Result};
use crate::record::{EntityRecord, FieldValue};
use crate::schema::{ChainKind, EntitySchema, FieldSlot, Multiplicity, SlotTarget, WritePredicate};
use crate::types::{DxfVersion, GroupValue};

pub(super) fn encode(
    schema: &EntitySchema,
    record: &EntityRecord,
    version: DxfVersion,
) -> Result<Vec<TagDirective>> {
    if schema.is_empty() {
        return Err(DxfError::InvariantViolation(format!(
            "cannot encode {} with an empty schema",
            schema.name()
        )));
    }
    if !version.is_known() {
        return Err(DxfError::UnsupportedVersion(format!(
            "cannot write {} without a target version",
            schema.name()
        )));
    }
    if record.schema().name() != schema.name() {
        return Err(DxfError::InvariantViolation(format!(
            "{} record encoded with the {} schema",
            record.schema().name(),
            schema.name()
        )));
    }

    let mut out = vec![TagDirective::new(0, schema.entity_name(version))];
    let mut object_ids_written = false;

    for slot in schema.slots() {
        if !slot.applies_to(version) || slot.element_of.is_some() {
            continue;
        }
        match &slot.target {
            SlotTarget::Constant(value) => {
                if slot.should_write(record, Some(value)) {
                    out.push(TagDirective::new(slot.code, value.clone()));
                }
            }
            SlotTarget::Chain(chain) => {
                if !matches!(slot.write, WritePredicate::Always) && !slot.should_write(record, None) {
                    continue;
                }
                encode_chain(record, slot, *chain, &mut object_ids_written, &mut out);
            }
            SlotTarget::Field(name) if schema.is_element_leader(name) => {
                encode_elements(schema, record, slot, name, version, &mut out);
            }
            SlotTarget::Field(name) => encode_field(record, slot, name, &mut out)?,
        }
    }
    Ok(out)
}

fn encode_field(
    record: &EntityRecord,
    slot: &FieldSlot,
    name: &str,
    out: &mut Vec<TagDirective>,
) -> Result<()> {
    match record.field(name) {
        Some(FieldValue::Single(value)) => {
            if slot.should_write(record, Some(value)) {
                out.push(TagDirective::new(slot.code, value.clone()));
            }
        }
        Some(FieldValue::List(values)) => {
            for value in values {
                if slot.should_write(record, Some(value)) {
                    out.push(TagDirective::new(slot.code, value.clone()));
                }
            }
        }
        None if slot.multiplicity == Multiplicity::Many => {}
        None => match &slot.default {
            Some(default) => {
                if slot.should_write(record, Some(default)) {
                    out.push(TagDirective::new(slot.code, default.clone()));
                }
            }
            None if slot.multiplicity == Multiplicity::One
                && matches!(slot.write, WritePredicate::Always) =>
            {
                return Err(DxfError::MissingField(name.to_string()));
            }
            None => {}
        },
    }
    Ok(())
}

/// Emit an element group one element at a time: the leader value followed by
/// each member's value at the same index.
fn encode_elements(
    schema: &EntitySchema,
    record: &EntityRecord,
    leader: &FieldSlot,
    name: &str,
    version: DxfVersion,
    out: &mut Vec<TagDirective>,
) {
    let members: Vec<&FieldSlot> = schema
        .element_members(name)
        .filter(|m| m.applies_to(version))
        .collect();
    for (index, value) in record.get_list(name).iter().enumerate() {
        if leader.should_write(record, Some(value)) {
            out.push(TagDirective::new(leader.code, value.clone()));
        }
        for member in &members {
            let Some(member_name) = member.field_name() else {
                continue;
            };
            let value = record
                .get_list(member_name)
                .get(index)
                .cloned()
                .unwrap_or_else(|| member.fill_value());
            if member.should_write(record, Some(&value)) {
                out.push(TagDirective::new(member.code, value));
            }
        }
    }
}

fn encode_chain(
    record: &EntityRecord,
    slot: &FieldSlot,
    chain: ChainKind,
    object_ids_written: &mut bool,
    out: &mut Vec<TagDirective>,
) {
    match chain {
        ChainKind::GraphicsData => out.extend(
            record
                .graphics_data()
                .iter()
                .map(|chunk| TagDirective::new(slot.code, GroupValue::Chunk(chunk.clone()))),
        ),
        ChainKind::EntityData => out.extend(
            record
                .entity_data()
                .iter()
                .map(|chunk| TagDirective::new(slot.code, GroupValue::Chunk(chunk.clone()))),
        ),
        // Object ids share one chain across 330/340/350/360; each node keeps
        // the code it was read with.
        ChainKind::ObjectIds => {
            if *object_ids_written {
                return;
            }
            *object_ids_written = true;
            out.extend(
                record
                    .object_ids()
                    .iter()
                    .map(|id| TagDirective::new(id.code, id.handle)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EntityCodec;
    use crate::schema::RecordKind;
    use crate::types::{BinaryChunk, Handle, ObjectIdRef};
    use std::sync::Arc;

    fn schema() -> Arc<EntitySchema> {
        Arc::new(
            EntitySchema::builder("THING", RecordKind::Entity)
                .named_before(DxfVersion::R14, "OLD_THING")
                .slot(FieldSlot::field(5, "handle").omit_blank())
                .slot(FieldSlot::marker("AcDbEntity").since(DxfVersion::R13))
                .slot(FieldSlot::field(8, "layer").default("0"))
                .slot(FieldSlot::field(6, "linetype").default("BYLAYER").omit_default())
                .slot(FieldSlot::field(370, "lineweight").since(DxfVersion::R14).default(-1))
                .slot(FieldSlot::field(2, "name"))
                .slot(
                    FieldSlot::chain(310, ChainKind::GraphicsData)
                        .when(WritePredicate::ChainNotEmpty(ChainKind::GraphicsData)),
                )
                .slot(FieldSlot::chain(330, ChainKind::ObjectIds))
                .slot(FieldSlot::chain(340, ChainKind::ObjectIds))
                .slot(FieldSlot::constant(94, 0))
                .build(),
        )
    }

    fn lines(directives: &[TagDirective]) -> Vec<(i32, String)> {
        directives.iter().map(|d| (d.code, d.value.format(6))).collect()
    }

    #[test]
    fn test_name_and_default_suppression() {
        let codec = EntityCodec::new(schema());
        let mut record = EntityRecord::with_defaults(schema());
        record.set("handle", Handle::new(0x1a)).unwrap();
        record.set("name", "A").unwrap();

        let out = lines(&codec.encode(&record, DxfVersion::R14).unwrap());
        assert_eq!(out[0], (0, "THING".to_string()));
        assert_eq!(out[1], (5, "1a".to_string()));
        assert!(out.iter().all(|(code, _)| *code != 6));
        assert!(out.contains(&(370, "-1".to_string())));

        let out = lines(&codec.encode(&record, DxfVersion::R13).unwrap());
        assert_eq!(out[0], (0, "OLD_THING".to_string()));
        assert!(out.iter().all(|(code, _)| *code != 370));
    }

    #[test]
    fn test_chains_in_order() {
        let codec = EntityCodec::new(schema());
        let mut record = EntityRecord::with_defaults(schema());
        record.set("name", "A").unwrap();
        for text in ["AA", "BB", "CC"] {
            record.graphics_data_mut().append(BinaryChunk::new(text).unwrap());
        }
        record.object_ids_mut().append(ObjectIdRef::hard_pointer(Handle::new(3)));
        record.object_ids_mut().append(ObjectIdRef::soft_pointer(Handle::new(4)));

        let out = lines(&codec.encode(&record, DxfVersion::R2000).unwrap());
        let chunks: Vec<_> = out.iter().filter(|(c, _)| *c == 310).map(|(_, v)| v.as_str()).collect();
        assert_eq!(chunks, ["AA", "BB", "CC"]);
        let ids: Vec<_> = out.iter().filter(|(c, _)| *c == 330 || *c == 340).cloned().collect();
        assert_eq!(ids, vec![(340, "3".to_string()), (330, "4".to_string())]);
        assert_eq!(out.last(), Some(&(94, "0".to_string())));
    }

    #[test]
    fn test_encode_errors() {
        let codec = EntityCodec::new(schema());
        let record = EntityRecord::with_defaults(schema());
        assert!(matches!(
            codec.encode(&record, DxfVersion::R2000),
            Err(DxfError::MissingField(name)) if name == "name"
        ));
        assert!(matches!(
            codec.encode(&record, DxfVersion::Unknown),
            Err(DxfError::UnsupportedVersion(_))
        ));

        let other = Arc::new(
            EntitySchema::builder("OTHER", RecordKind::Entity)
                .slot(FieldSlot::field(8, "layer"))
                .build(),
        );
        let foreign = EntityRecord::with_defaults(other);
        assert!(matches!(
            codec.encode(&foreign, DxfVersion::R2000),
            Err(DxfError::InvariantViolation(_))
        ));

        let empty = EntityCodec::new(Arc::new(EntitySchema::builder("THING", RecordKind::Entity).build()));
        assert!(matches!(
            empty.encode(&record, DxfVersion::R2000),
            Err(DxfError::InvariantViolation(_))
        ));
    }
}
