//! DXF section readers

use super::tag_reader::TagReader;
use crate::codec::EntityCodec;
use crate::document::DxfDocument;
use crate::error::{DxfError, Result};
use crate::notification::{NotificationCollection, NotificationType};
use crate::record::EntityRecord;
use crate::schema::SchemaRegistry;
use crate::types::DxfVersion;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::io::BufRead;
use std::sync::Arc;

/// Values of the header variables the reader needs before decoding.
#[derive(Debug, Clone, Default)]
pub(super) struct HeaderInfo {
    pub version: DxfVersion,
    pub code_page: Option<String>,
}

/// Entity names that end a run of records.
fn is_terminator(name: &str) -> bool {
    matches!(name, "ENDSEC" | "ENDTAB" | "EOF")
}

/// The text of one record body, cut out of a section for parallel decoding.
struct RawBlock {
    name: String,
    /// Line number of the entity-name line
    first_line: usize,
    /// Code/value lines of the body followed by the closing `0` line
    body: String,
}

impl RawBlock {
    fn new(name: String, first_line: usize) -> Self {
        Self {
            name,
            first_line,
            body: String::new(),
        }
    }

    fn decode(
        &self,
        registry: &SchemaRegistry,
        version: DxfVersion,
    ) -> Result<(Option<EntityRecord>, NotificationCollection)> {
        let mut notes = NotificationCollection::new();
        let Some(schema) = registry.get(&self.name) else {
            return Ok((None, notes));
        };
        let mut reader = TagReader::new(self.body.as_bytes())
            .with_version(version)
            .with_line_offset(self.first_line);
        let record = EntityCodec::new(Arc::clone(schema)).decode(&mut reader, &mut notes)?;
        Ok((Some(record), notes))
    }
}

/// Section reader for parsing DXF sections
pub(super) struct SectionReader<'a, R: BufRead> {
    reader: &'a mut TagReader<R>,
    registry: &'a SchemaRegistry,
    parallel: bool,
    /// The `0/ENDSEC` (or `0/EOF`) closing the section has been consumed.
    ended: bool,
}

impl<'a, R: BufRead> SectionReader<'a, R> {
    pub fn new(reader: &'a mut TagReader<R>, registry: &'a SchemaRegistry, parallel: bool) -> Self {
        Self {
            reader,
            registry,
            parallel,
            ended: false,
        }
    }

    /// Read the HEADER section, keeping `$ACADVER` and `$DWGCODEPAGE`.
    pub fn read_header(&mut self) -> Result<HeaderInfo> {
        let mut header = HeaderInfo::default();
        while let Some((code, value)) = self.reader.read_pair()? {
            if code == 0 && value == "ENDSEC" {
                self.ended = true;
                break;
            }
            if code != 9 {
                continue;
            }
            match value.as_str() {
                "$ACADVER" => {
                    if let Some((1, version)) = self.reader.read_pair()? {
                        header.version = DxfVersion::from_version_string(&version);
                    }
                }
                "$DWGCODEPAGE" => {
                    if let Some((3, code_page)) = self.reader.read_pair()? {
                        header.code_page = Some(code_page.trim().to_string());
                    }
                }
                _ => {}
            }
        }
        Ok(header)
    }

    /// Read the TABLES section. Entries of tables with a registered schema are
    /// decoded; other tables are skipped.
    pub fn read_tables(&mut self, document: &mut DxfDocument) -> Result<()> {
        loop {
            let name = self.next_record_name()?;
            match name.as_str() {
                "TABLE" => self.read_table(document)?,
                "ENDSEC" => {
                    self.ended = true;
                    return Ok(());
                }
                "EOF" => return self.unterminated("TABLES"),
                _ => {}
            }
        }
    }

    /// Read one `0/TABLE` ... `0/ENDTAB` block.
    fn read_table(&mut self, document: &mut DxfDocument) -> Result<()> {
        let mut table_name = String::new();
        let first = loop {
            let code = self.reader.next_group_code()?;
            let value = self.reader.read_raw()?;
            match code {
                0 => break value,
                2 if table_name.is_empty() => table_name = value,
                _ => {}
            }
        };

        let mut records = Vec::new();
        let result = self.read_serial(first, &mut records, &mut document.notifications);
        store(document, records);
        match result?.as_str() {
            "ENDTAB" => Ok(()),
            "ENDSEC" => {
                self.ended = true;
                Err(DxfError::Parse(format!("table {} is not closed by ENDTAB", table_name)))
            }
            _ => self.unterminated("TABLES"),
        }
    }

    /// Read an ENTITIES or OBJECTS section.
    pub fn read_records(&mut self, section: &str, document: &mut DxfDocument) -> Result<()> {
        let first = self.next_record_name()?;
        let mut records = Vec::new();
        let result = if self.parallel {
            self.read_parallel(first, &mut records, &mut document.notifications)
        } else {
            self.read_serial(first, &mut records, &mut document.notifications)
        };
        store(document, records);
        match result?.as_str() {
            "ENDSEC" => {
                self.ended = true;
                Ok(())
            }
            _ => self.unterminated(section),
        }
    }

    /// Decode records one after another until a terminator name; returns it.
    fn read_serial(
        &mut self,
        mut name: String,
        records: &mut Vec<EntityRecord>,
        notes: &mut NotificationCollection,
    ) -> Result<String> {
        let registry = self.registry;
        let mut skipped: IndexMap<String, usize> = IndexMap::new();
        let result = loop {
            if is_terminator(&name) {
                break Ok(name);
            }
            let step = match registry.get(&name) {
                Some(schema) => match EntityCodec::new(Arc::clone(schema)).decode(self.reader, notes) {
                    Ok(record) => {
                        records.push(record);
                        self.reader.read_raw()
                    }
                    Err(e) => Err(e),
                },
                None => {
                    *skipped.entry(name).or_insert(0) += 1;
                    self.skip_record()
                }
            };
            match step {
                Ok(next) => name = next,
                Err(e) => break Err(e),
            }
        };
        report_skipped(&skipped, notes);
        result
    }

    /// Split the section into record blocks, decode them on the rayon pool
    /// and collect the results in file order.
    fn read_parallel(
        &mut self,
        first: String,
        records: &mut Vec<EntityRecord>,
        notes: &mut NotificationCollection,
    ) -> Result<String> {
        let (blocks, terminator) = self.collect_blocks(first)?;
        let registry = self.registry;
        let version = self.reader.version();

        let decoded: Vec<_> = blocks
            .par_iter()
            .map(|block| block.decode(registry, version))
            .collect();

        let mut skipped: IndexMap<String, usize> = IndexMap::new();
        for (block, result) in blocks.iter().zip(decoded) {
            let (record, block_notes) = result?;
            notes.append(block_notes);
            match record {
                Some(record) => records.push(record),
                None => *skipped.entry(block.name.clone()).or_insert(0) += 1,
            }
        }
        report_skipped(&skipped, notes);
        Ok(terminator)
    }

    fn collect_blocks(&mut self, first: String) -> Result<(Vec<RawBlock>, String)> {
        let mut blocks = Vec::new();
        let mut current = RawBlock::new(first, self.reader.line_number());
        loop {
            if is_terminator(&current.name) {
                return Ok((blocks, current.name));
            }
            let code = self.reader.next_group_code()?;
            let value = self.reader.read_raw()?;
            if code == 0 {
                current.body.push_str("0\n");
                let next = RawBlock::new(value, self.reader.line_number());
                blocks.push(std::mem::replace(&mut current, next));
            } else {
                current.body.push_str(&format!("{}\n{}\n", code, value));
            }
        }
    }

    /// Value of the next `0` group code, skipping anything before it.
    fn next_record_name(&mut self) -> Result<String> {
        loop {
            let code = self.reader.next_group_code()?;
            let value = self.reader.read_raw()?;
            if code == 0 {
                return Ok(value);
            }
        }
    }

    /// Skip the body of a record; returns the name of the next one.
    fn skip_record(&mut self) -> Result<String> {
        loop {
            let code = self.reader.next_group_code()?;
            if code == 0 {
                return self.reader.read_raw();
            }
            self.reader.skip_value()?;
        }
    }

    /// Skip the rest of the current section.
    pub fn skip_section(&mut self) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        while let Some((code, value)) = self.reader.read_pair()? {
            if code == 0 && (value == "ENDSEC" || value == "EOF") {
                break;
            }
        }
        self.ended = true;
        Ok(())
    }

    fn unterminated(&mut self, section: &str) -> Result<()> {
        self.ended = true;
        Err(DxfError::Parse(format!("{} section is not closed by ENDSEC", section)))
    }
}

/// Hand decoded records to the document, one batch per record type.
fn store(document: &mut DxfDocument, records: Vec<EntityRecord>) {
    let mut by_type: IndexMap<&'static str, Vec<EntityRecord>> = IndexMap::new();
    for record in records {
        by_type.entry(record.entity_name()).or_default().push(record);
    }
    for (_, batch) in by_type {
        document.extend_records(batch);
    }
}

fn report_skipped(skipped: &IndexMap<String, usize>, notes: &mut NotificationCollection) {
    for (name, count) in skipped {
        notes.notify(
            NotificationType::NotImplemented,
            format!("{} record(s) of type {} skipped", count, name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_entities(text: &str, parallel: bool) -> (Result<()>, DxfDocument) {
        let registry = SchemaRegistry::builtin();
        let mut reader = TagReader::new(Cursor::new(text.as_bytes())).with_version(DxfVersion::R2000);
        let mut document = DxfDocument::with_version(DxfVersion::R2000);
        let result = SectionReader::new(&mut reader, &registry, parallel)
            .read_records("ENTITIES", &mut document);
        (result, document)
    }

    const ENTITIES: &str = "  0\nINSERT\n  8\nA\n  2\nB1\n  0\nLINE\n  8\n0\n  0\nINSERT\n  8\nC\n  2\nB2\n  0\nENDSEC\n";

    #[test]
    fn test_serial_and_parallel_agree() {
        let (serial, serial_doc) = read_entities(ENTITIES, false);
        let (parallel, parallel_doc) = read_entities(ENTITIES, true);
        serial.unwrap();
        parallel.unwrap();
        let serial_inserts = serial_doc.entities_of("INSERT").unwrap();
        assert_eq!(serial_inserts.len(), 2);
        assert_eq!(Some(serial_inserts), parallel_doc.entities_of("INSERT"));
        assert!(serial_doc.notifications.has_type(NotificationType::NotImplemented));
        assert!(parallel_doc.notifications.has_type(NotificationType::NotImplemented));
    }

    #[test]
    fn test_parallel_line_numbers_are_absolute() {
        let text = "  0\nINSERT\n  2\nB1\n 41\nabc\n  0\nENDSEC\n";
        for parallel in [false, true] {
            let (result, doc) = read_entities(text, parallel);
            result.unwrap();
            let malformed = doc.notifications.of_type(NotificationType::MalformedValue);
            assert_eq!(malformed.len(), 1);
            assert_eq!(malformed[0].line, Some(6));
        }
    }

    #[test]
    fn test_missing_endsec() {
        let (result, doc) = read_entities("  0\nINSERT\n  2\nB1\n  0\nEOF\n", false);
        assert!(matches!(result, Err(DxfError::Parse(_))));
        assert_eq!(doc.entity_count(), 1);
    }

    #[test]
    fn test_header_values() {
        let text = "  9\n$ACADVER\n  1\nAC1014\n  9\n$DWGCODEPAGE\n  3\nANSI_1251\n  0\nENDSEC\n";
        let registry = SchemaRegistry::new();
        let mut reader = TagReader::new(Cursor::new(text.as_bytes()));
        let header = SectionReader::new(&mut reader, &registry, false)
            .read_header()
            .unwrap();
        assert_eq!(header.version, DxfVersion::R14);
        assert_eq!(header.code_page.as_deref(), Some("ANSI_1251"));
    }
}
