//! Integration tests for the entity codec: exact output, lenient decoding,
//! version gating, binary chains and record ownership.

mod common;

use common::{codes, decode_body, encode_text, round_trip};
use dxf_entity_codec::entities::common::field as common_field;
use dxf_entity_codec::entities::{insert, light, proxy_entity};
use dxf_entity_codec::objects::spatial_index;
use dxf_entity_codec::tables::linetype::{self, LineTypeElement};
use dxf_entity_codec::types::BinaryChunk;
use dxf_entity_codec::{
    DxfError, DxfVersion, EntityCodec, GroupValue, Handle, LinkedChain, NotificationCollection,
    NotificationType, ObjectIdRef, TagReader,
};

// ===========================================================================
// Exact output
// ===========================================================================

#[test]
fn test_proxy_entity_r14_prelude() {
    let mut record = proxy_entity::new_record();
    record.set(common_field::HANDLE, Handle::new(0x1a)).unwrap();

    let text = encode_text(&record, DxfVersion::R14);
    assert!(
        text.starts_with("  0\nACAD_PROXY_ENTITY\n  5\n1a\n"),
        "unexpected start: {}",
        text
    );
    assert!(text.contains("  8\n0\n"));
    assert!(!text.contains("  6\n"), "default linetype must be omitted");
}

#[test]
fn test_proxy_entity_name_follows_version() {
    let record = proxy_entity::new_record();
    assert!(encode_text(&record, DxfVersion::R13).starts_with("  0\nACAD_ZOMBIE_ENTITY\n"));
    assert!(encode_text(&record, DxfVersion::R2018).starts_with("  0\nACAD_PROXY_ENTITY\n"));
}

#[test]
fn test_non_default_linetype_is_written() {
    let mut record = insert::new("DOOR", [0.0; 3]).unwrap();
    record.set(common_field::LINETYPE, "DASHED").unwrap();
    assert!(encode_text(&record, DxfVersion::R2000).contains("  6\nDASHED\n"));
}

// ===========================================================================
// Lenient decoding
// ===========================================================================

#[test]
fn test_unknown_tag_then_layer() {
    let codec = EntityCodec::new(insert::schema());
    let body = "9999\nwhatever\n  8\nMyLayer\n  0\nNEXTENTITY\n";
    let mut reader = TagReader::new(body.as_bytes()).with_version(DxfVersion::R2000);
    let mut notes = NotificationCollection::new();

    let record = codec.decode(&mut reader, &mut notes).unwrap();
    assert_eq!(record.get_str(common_field::LAYER), Some("MyLayer"));
    let unknown = notes.of_type(NotificationType::UnknownTag);
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].code, Some(9999));
    // No block name (group 2) was supplied
    let missing = notes.of_type(NotificationType::Warning);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].code, Some(2));
    // The sentinel's value line is left for the caller
    assert_eq!(reader.read_raw().unwrap(), "NEXTENTITY");
}

#[test]
fn test_decode_stops_at_sentinel_after_noise() {
    let codec = EntityCodec::new(light::schema());
    let mut body = String::new();
    for i in 0..50 {
        body.push_str(&format!("{}\nnoise\n", 2000 + i));
    }
    body.push_str(" 40\nnot a number\n  0\nLIGHT\n  1\nnext\n");
    let (record, notes) = decode_body(&codec, &body, DxfVersion::R2007);
    assert_eq!(notes.of_type(NotificationType::UnknownTag).len(), 50);
    assert_eq!(notes.of_type(NotificationType::MalformedValue).len(), 1);
    assert_eq!(record.get_real(light::field::INTENSITY), Some(1.0));
}

#[test]
fn test_eof_inside_record_is_an_error() {
    let codec = EntityCodec::new(insert::schema());
    let mut reader = TagReader::new("  8\nL\n  2\n".as_bytes());
    let mut notes = NotificationCollection::new();
    assert!(codec.decode(&mut reader, &mut notes).is_err());
}

// ===========================================================================
// Version gating
// ===========================================================================

#[test]
fn test_r14_fields_absent_from_r13_output() {
    let mut record = insert::new("B", [0.0; 3]).unwrap();
    record
        .set(common_field::DICTIONARY_OWNER_HARD, Handle::new(0x2f))
        .unwrap();

    let r13 = codes(&record, DxfVersion::R13);
    assert!(!r13.contains(&102));
    assert!(!r13.contains(&360));

    let r14 = codes(&record, DxfVersion::R14);
    assert!(r14.contains(&102));
    assert!(r14.contains(&360));
}

#[test]
fn test_r14_fields_accepted_in_r13_input() {
    let codec = EntityCodec::new(insert::schema());
    let body = "102\n{ACAD_XDICTIONARY\n360\n2f\n102\n}\n  8\n0\n  2\nB\n  0\nEOF\n";
    let (record, notes) = decode_body(&codec, body, DxfVersion::R13);
    assert_eq!(
        record.get(common_field::DICTIONARY_OWNER_HARD),
        Some(&GroupValue::HexId(Handle::new(0x2f)))
    );
    assert!(notes.has_type(NotificationType::VersionMismatch));
    assert!(!notes.has_type(NotificationType::Error));
}

#[test]
fn test_encode_unknown_version_is_rejected() {
    let record = insert::new("B", [0.0; 3]).unwrap();
    let result = EntityCodec::new(insert::schema()).encode(&record, DxfVersion::Unknown);
    assert!(matches!(result, Err(DxfError::UnsupportedVersion(_))));
}

// ===========================================================================
// Binary chains
// ===========================================================================

#[test]
fn test_three_chunks_three_lines() {
    let mut record = proxy_entity::new_record();
    record.set(common_field::HANDLE, Handle::new(0x40)).unwrap();
    let payload: Vec<u8> = (0..3 * 127).map(|i| (i % 256) as u8).collect();
    proxy_entity::set_graphics_data(&mut record, &payload).unwrap();
    assert_eq!(record.graphics_data().len(), 3);

    let text = encode_text(&record, DxfVersion::R2000);
    assert_eq!(text.matches("\n310\n").count(), 3);

    let (decoded, notes) = round_trip(&record, DxfVersion::R2000);
    assert!(notes.is_empty(), "{:?}", notes);
    assert_eq!(decoded.graphics_data().len(), 3);
    let original: Vec<&str> = record.graphics_data().iter().map(BinaryChunk::as_str).collect();
    let read: Vec<&str> = decoded.graphics_data().iter().map(BinaryChunk::as_str).collect();
    assert_eq!(original, read);
    assert_eq!(proxy_entity::graphics_data(&decoded), payload);
    assert_eq!(decoded, record);
}

#[test]
fn test_proxy_owner_pointers_are_positional() {
    let codec = EntityCodec::new(proxy_entity::schema());
    let body = "100\nAcDbEntity\n  8\n0\n 92\n0\n100\nAcDbProxyEntity\n 90\n498\n 91\n500\n 93\n16\n\
                310\nABCD\n330\n11\n330\n12\n330\n13\n340\n20\n 94\n0\n 95\n0\n 70\n0\n  0\nEOF\n";
    let (record, notes) = decode_body(&codec, body, DxfVersion::R2000);
    assert!(notes.is_empty(), "{:?}", notes);
    assert_eq!(proxy_entity::entity_data(&record), vec![0xAB, 0xCD]);
    assert!(record.graphics_data().is_empty());

    assert_eq!(
        record.get(common_field::DICTIONARY_OWNER_SOFT),
        Some(&GroupValue::HexId(Handle::new(0x11)))
    );
    assert_eq!(
        record.get(common_field::OBJECT_OWNER_SOFT),
        Some(&GroupValue::HexId(Handle::new(0x12)))
    );
    let ids: Vec<(i32, u32)> = record
        .object_ids()
        .iter()
        .map(|id| (id.code, id.handle.value()))
        .collect();
    assert_eq!(ids, vec![(330, 0x13), (340, 0x20)]);
}

#[test]
fn test_proxy_object_owner_alone_round_trips() {
    let mut record = proxy_entity::new_record();
    record.set(common_field::OBJECT_OWNER_SOFT, Handle::new(0x1f)).unwrap();

    // A null dictionary owner keeps the object owner in second position
    let text = encode_text(&record, DxfVersion::R2000);
    assert!(text.contains("330\n0\n330\n1f\n"), "{}", text);

    let (decoded, notes) = round_trip(&record, DxfVersion::R2000);
    assert!(notes.is_empty(), "{:?}", notes);
    assert!(decoded.get(common_field::DICTIONARY_OWNER_SOFT).is_none());
    assert_eq!(
        decoded.get(common_field::OBJECT_OWNER_SOFT),
        Some(&GroupValue::HexId(Handle::new(0x1f)))
    );
    assert_eq!(decoded, record);
}

#[test]
fn test_proxy_object_ids_without_owners_round_trip() {
    let mut record = proxy_entity::new_record();
    record.object_ids_mut().append(ObjectIdRef::new(330, Handle::new(0x11)));
    record.object_ids_mut().append(ObjectIdRef::new(340, Handle::new(0x12)));

    for version in [DxfVersion::R12, DxfVersion::R13, DxfVersion::R2000, DxfVersion::R2018] {
        let (decoded, notes) = round_trip(&record, version);
        assert!(notes.is_empty(), "{}: {:?}", version, notes);
        assert!(decoded.get(common_field::DICTIONARY_OWNER_SOFT).is_none(), "{}", version);
        assert!(decoded.get(common_field::OBJECT_OWNER_SOFT).is_none(), "{}", version);
        let ids: Vec<(i32, u32)> = decoded
            .object_ids()
            .iter()
            .map(|id| (id.code, id.handle.value()))
            .collect();
        assert_eq!(ids, vec![(330, 0x11), (340, 0x12)], "{}", version);
    }
}

#[test]
fn test_proxy_with_owners_ids_and_data_round_trips() {
    let mut record = proxy_entity::new_record();
    record.set(common_field::HANDLE, Handle::new(0x51)).unwrap();
    record.set(common_field::DICTIONARY_OWNER_SOFT, Handle::new(0x20)).unwrap();
    record.set(common_field::OBJECT_OWNER_SOFT, Handle::new(0x1f)).unwrap();
    let graphics: Vec<u8> = (0..200).map(|i| (i * 7 % 256) as u8).collect();
    proxy_entity::set_graphics_data(&mut record, &graphics).unwrap();
    proxy_entity::set_entity_data(&mut record, &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
    record.object_ids_mut().append(ObjectIdRef::new(330, Handle::new(0x30)));
    record.object_ids_mut().append(ObjectIdRef::new(360, Handle::new(0x31)));
    record.object_ids_mut().append(ObjectIdRef::new(330, Handle::new(0x32)));

    for version in [DxfVersion::R13, DxfVersion::R14, DxfVersion::R2007, DxfVersion::R2018] {
        let (decoded, notes) = round_trip(&record, version);
        assert!(notes.is_empty(), "{}: {:?}", version, notes);
        assert_eq!(proxy_entity::graphics_data(&decoded), graphics, "{}", version);
        assert_eq!(proxy_entity::entity_data(&decoded), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(decoded, record, "{}", version);
    }
}

// ===========================================================================
// Round trips of each table
// ===========================================================================

#[test]
fn test_insert_round_trip_all_versions() {
    let mut record = insert::new("WINDOW", [10.5, -3.25, 0.0]).unwrap();
    record.set(insert::field::X_SCALE, 2.0).unwrap();
    record.set(insert::field::ROTATION, 90.0).unwrap();
    record.set(insert::field::COLUMN_COUNT, 3).unwrap();
    record.set(insert::field::COLUMN_SPACING, 1.5).unwrap();
    record.set(common_field::LAYER, "FRAMES").unwrap();
    for version in [DxfVersion::R12, DxfVersion::R14, DxfVersion::R2000, DxfVersion::R2018] {
        let (decoded, notes) = round_trip(&record, version);
        assert!(notes.is_empty(), "{}: {:?}", version, notes);
        assert_eq!(decoded, record, "{}", version);
    }
}

#[test]
fn test_light_round_trip() {
    let mut record = light::new_record();
    record.set(light::field::NAME, "Spot1").unwrap();
    record.set(light::field::INTENSITY, 0.75).unwrap();
    record.set(light::field::POSITION_Z, 12.0).unwrap();
    let (decoded, notes) = round_trip(&record, DxfVersion::R2007);
    assert!(notes.is_empty(), "{:?}", notes);
    assert_eq!(decoded, record);
}

#[test]
fn test_spatial_index_round_trip() {
    let mut record = spatial_index::new_record();
    record.set(common_field::HANDLE, Handle::new(0x99)).unwrap();
    record.set(spatial_index::field::TIMESTAMP, 2451544.5).unwrap();
    let (decoded, notes) = round_trip(&record, DxfVersion::R2000);
    assert!(notes.is_empty(), "{:?}", notes);
    assert_eq!(decoded, record);
}

#[test]
fn test_linetype_round_trip() {
    let mut record = linetype::new("DASHDOT").unwrap();
    linetype::push_element(&mut record, &LineTypeElement::dash(0.5)).unwrap();
    linetype::push_element(&mut record, &LineTypeElement::space(0.25)).unwrap();
    linetype::push_element(&mut record, &LineTypeElement::dot()).unwrap();
    linetype::push_element(&mut record, &LineTypeElement::space(0.25)).unwrap();

    let dashes = codes(&record, DxfVersion::R2000)
        .into_iter()
        .filter(|c| *c == 49)
        .count();
    assert_eq!(dashes, 4);

    let (decoded, notes) = round_trip(&record, DxfVersion::R2000);
    assert!(notes.is_empty(), "{:?}", notes);
    assert_eq!(linetype::elements(&decoded), linetype::elements(&record));
    assert_eq!(decoded.get_real(linetype::field::PATTERN_LENGTH), Some(1.0));
}

// ===========================================================================
// Ownership
// ===========================================================================

#[test]
fn test_free_requires_unlinked_record() {
    let mut head = insert::new("A", [0.0; 3]).unwrap();
    head.set_next(Some(insert::new("B", [0.0; 3]).unwrap()));

    let err = head.free().unwrap_err();
    assert!(err.to_string().starts_with("invariant violation"));

    let mut head = err.into_inner();
    let next = head.take_next().unwrap();
    assert_eq!(next.get_str(insert::field::BLOCK_NAME), Some("B"));
    head.free().unwrap();
    next.free().unwrap();
}

#[test]
fn test_chain_last_on_single_node() {
    let mut chain = LinkedChain::new();
    assert!(chain.last().is_none());
    chain.append(7);
    assert_eq!(chain.first(), Some(&7));
    assert_eq!(chain.last(), Some(&7));
    chain.append(8);
    assert_eq!(chain.last(), Some(&8));
    assert_eq!(chain.len(), 2);
}
