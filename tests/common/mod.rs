//! Shared test utilities for the integration tests.
//!
//! Helpers to turn a record into tag text and back, and to build small DXF
//! files in memory. Every test crate imports them via `mod common;`.

#![allow(dead_code)]

use dxf_entity_codec::io::dxf::{DxfStreamWriterExt, TagWriter};
use dxf_entity_codec::{
    DxfDocument, DxfReader, DxfReaderConfiguration, DxfVersion, EntityCodec, EntityRecord,
    NotificationCollection, TagReader,
};
use std::io::Cursor;
use std::path::PathBuf;

// ===========================================================================
// Paths
// ===========================================================================

/// Resolve path into the `test_output/` directory, creating it if needed.
pub fn test_output_path(filename: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_output");
    std::fs::create_dir_all(&dir).ok();
    dir.join(filename)
}

// ===========================================================================
// Single records
// ===========================================================================

/// Encode one record as tag text, entity-name line included.
pub fn encode_text(record: &EntityRecord, version: DxfVersion) -> String {
    let codec = EntityCodec::new(record.schema().clone());
    let mut buf = Vec::new();
    {
        let mut writer = TagWriter::new(&mut buf);
        writer.write_entity(&codec, record, version).unwrap();
    }
    String::from_utf8(buf).unwrap()
}

/// Decode a record body (the lines after the entity name) that ends with a
/// `0` line.
pub fn decode_body(
    codec: &EntityCodec,
    body: &str,
    version: DxfVersion,
) -> (EntityRecord, NotificationCollection) {
    let mut reader = TagReader::new(Cursor::new(body.as_bytes())).with_version(version);
    let mut notes = NotificationCollection::new();
    let record = codec.decode(&mut reader, &mut notes).unwrap();
    (record, notes)
}

/// Strip the entity-name pair from encoded text.
pub fn body_of(text: &str) -> &str {
    let mut rest = text;
    for _ in 0..2 {
        rest = &rest[rest.find('\n').map_or(rest.len(), |i| i + 1)..];
    }
    rest
}

/// Encode at `version` and decode the result with the same schema.
pub fn round_trip(
    record: &EntityRecord,
    version: DxfVersion,
) -> (EntityRecord, NotificationCollection) {
    let codec = EntityCodec::new(record.schema().clone());
    let text = encode_text(record, version);
    let body = format!("{}  0\nEOF\n", body_of(&text));
    decode_body(&codec, &body, version)
}

/// Group codes of an encoded record, in output order.
pub fn codes(record: &EntityRecord, version: DxfVersion) -> Vec<i32> {
    EntityCodec::new(record.schema().clone())
        .encode(record, version)
        .unwrap()
        .iter()
        .map(|d| d.code)
        .collect()
}

// ===========================================================================
// Whole files
// ===========================================================================

/// A minimal file: HEADER with `$ACADVER`, then the given ENTITIES body.
pub fn dxf_with_entities(version: &str, entities: &str) -> String {
    format!(
        "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\n{}\n  0\nENDSEC\n  0\nSECTION\n  2\nENTITIES\n{}  0\nENDSEC\n  0\nEOF\n",
        version, entities
    )
}

/// Read a document from in-memory bytes.
pub fn read_bytes(bytes: &[u8], config: DxfReaderConfiguration) -> DxfDocument {
    DxfReader::from_reader(Cursor::new(bytes))
        .with_configuration(config)
        .read()
        .unwrap()
}

/// Read a document from text with the default configuration.
pub fn read_text(text: &str) -> DxfDocument {
    read_bytes(text.as_bytes(), DxfReaderConfiguration::default())
}
