//! DXF document: decoded records grouped by section and type

use crate::entities::common::field;
use crate::error::{DxfError, Result};
use crate::notification::NotificationCollection;
use crate::record::{EntityList, EntityRecord};
use crate::schema::RecordKind;
use crate::types::{DxfVersion, Handle};
use indexmap::IndexMap;

/// First handle handed out by [`DxfDocument::allocate_handle`]; lower values
/// are left for the well-known table handles.
const FIRST_FREE_HANDLE: u64 = 0x10;

/// The records of one DXF file.
///
/// Each section keeps one homogeneous [`EntityList`] per record type, keyed
/// by the canonical type name (or table name for table entries) in order of
/// first appearance. Records of different types that were interleaved in the
/// file are written back grouped by type.
#[derive(Debug, Clone)]
pub struct DxfDocument {
    /// Version declared by `$ACADVER`
    pub version: DxfVersion,
    /// `$DWGCODEPAGE`, when the file declares one
    pub code_page: Option<String>,
    /// Notifications collected during the last read
    pub notifications: NotificationCollection,
    tables: IndexMap<String, EntityList>,
    entities: IndexMap<String, EntityList>,
    objects: IndexMap<String, EntityList>,
    /// One past the highest handle in use; reaches `2^32` once `FFFFFFFF` is taken.
    next_handle: u64,
}

impl DxfDocument {
    /// Create an empty document with an unknown version
    pub fn new() -> Self {
        Self {
            version: DxfVersion::Unknown,
            code_page: None,
            notifications: NotificationCollection::new(),
            tables: IndexMap::new(),
            entities: IndexMap::new(),
            objects: IndexMap::new(),
            next_handle: FIRST_FREE_HANDLE,
        }
    }

    /// Create a document with a specific version
    pub fn with_version(version: DxfVersion) -> Self {
        let mut doc = Self::new();
        doc.version = version;
        doc
    }

    /// Allocate a new unique handle
    pub fn allocate_handle(&mut self) -> Result<Handle> {
        let value = u32::try_from(self.next_handle).map_err(|_| DxfError::HandlesExhausted)?;
        self.next_handle += 1;
        Ok(Handle::new(value))
    }

    /// Get the next handle value (without allocating)
    pub fn next_handle(&self) -> u64 {
        self.next_handle
    }

    /// Add a record, assigning a handle when it has none.
    pub fn add_record(&mut self, mut record: EntityRecord) -> Result<Handle> {
        let handle = match record.get(field::HANDLE).and_then(|v| v.as_handle()) {
            Some(handle) if !handle.is_null() => handle,
            _ => {
                let handle = self.allocate_handle()?;
                record.set(field::HANDLE, handle)?;
                handle
            }
        };
        self.next_handle = self.next_handle.max(u64::from(handle.value()) + 1);
        self.push_record(record);
        Ok(handle)
    }

    /// Append a record as read, without touching its handle.
    pub fn push_record(&mut self, record: EntityRecord) {
        let (section, key) = self.section_for(&record);
        section.entry(key).or_default().append(record);
    }

    /// Append a batch of records of one type.
    pub(crate) fn extend_records(&mut self, records: Vec<EntityRecord>) {
        let Some(first) = records.first() else {
            return;
        };
        let (section, key) = self.section_for(first);
        section.entry(key).or_default().extend(records);
    }

    fn section_for(&mut self, record: &EntityRecord) -> (&mut IndexMap<String, EntityList>, String) {
        match record.schema().kind() {
            RecordKind::Entity => (&mut self.entities, record.entity_name().to_string()),
            RecordKind::Object => (&mut self.objects, record.entity_name().to_string()),
            RecordKind::TableEntry(table) => (&mut self.tables, table.to_string()),
        }
    }

    /// Entity lists in order of first appearance
    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityList)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Object lists in order of first appearance
    pub fn objects(&self) -> impl Iterator<Item = (&str, &EntityList)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Table entry lists keyed by table name
    pub fn tables(&self) -> impl Iterator<Item = (&str, &EntityList)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Records of one entity type (canonical name, case-insensitive).
    pub fn entities_of(&self, name: &str) -> Option<&EntityList> {
        find_list(&self.entities, name)
    }

    pub fn objects_of(&self, name: &str) -> Option<&EntityList> {
        find_list(&self.objects, name)
    }

    /// Entries of one symbol table.
    pub fn table(&self, name: &str) -> Option<&EntityList> {
        find_list(&self.tables, name)
    }

    /// Get the number of entities
    pub fn entity_count(&self) -> usize {
        self.entities.values().map(EntityList::len).sum()
    }

    pub fn object_count(&self) -> usize {
        self.objects.values().map(EntityList::len).sum()
    }

    /// Number of records in every section.
    pub fn record_count(&self) -> usize {
        self.entity_count()
            + self.object_count()
            + self.tables.values().map(EntityList::len).sum::<usize>()
    }

    /// Raise `next_handle` above every handle in the document.
    ///
    /// The reader calls this once after loading so later `allocate_handle`
    /// calls do not collide with handles from the file.
    pub fn resolve_handles(&mut self) {
        let max = self
            .tables
            .values()
            .chain(self.entities.values())
            .chain(self.objects.values())
            .flat_map(EntityList::iter)
            .filter_map(|r| r.get(field::HANDLE).and_then(|v| v.as_handle()))
            .map(|h| u64::from(h.value()) + 1)
            .max()
            .unwrap_or(0);
        self.next_handle = self.next_handle.max(max);
    }

    /// Release every record, list by list.
    pub fn free_all(self) -> Result<()> {
        for (_, list) in self
            .tables
            .into_iter()
            .chain(self.entities)
            .chain(self.objects)
        {
            list.free_all()?;
        }
        Ok(())
    }
}

impl Default for DxfDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn find_list<'a>(lists: &'a IndexMap<String, EntityList>, name: &str) -> Option<&'a EntityList> {
    lists
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, list)| list)
}
