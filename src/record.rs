//! Decoded entity records
//!
//! An [`EntityRecord`] is the in-memory form of one entity, object or table
//! entry: a field map keyed by the names its schema declares, the owned
//! sub-record chains, and the link to the next sibling of a homogeneous list.

use crate::chain::LinkedChain;
use crate::error::{DxfError, FreeError, Result};
use crate::schema::{ChainKind, EntitySchema, FieldSlot, Multiplicity};
use crate::types::{BinaryChunk, GroupValue, ObjectIdRef, ValueKind};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Value stored under a field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Single(GroupValue),
    /// Repeated field; element groups keep member lists index-aligned with
    /// their leader.
    List(Vec<GroupValue>),
}

impl FieldValue {
    pub fn as_single(&self) -> Option<&GroupValue> {
        match self {
            FieldValue::Single(v) => Some(v),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> &[GroupValue] {
        match self {
            FieldValue::Single(v) => std::slice::from_ref(v),
            FieldValue::List(values) => values,
        }
    }
}

/// One decoded entity, object or table entry.
pub struct EntityRecord {
    schema: Arc<EntitySchema>,
    fields: IndexMap<&'static str, FieldValue>,
    graphics_data: LinkedChain<BinaryChunk>,
    entity_data: LinkedChain<BinaryChunk>,
    object_ids: LinkedChain<ObjectIdRef>,
    next: Option<Box<EntityRecord>>,
}

impl EntityRecord {
    /// Create an empty record: no fields, empty chains, no sibling.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            fields: IndexMap::new(),
            graphics_data: LinkedChain::new(),
            entity_data: LinkedChain::new(),
            object_ids: LinkedChain::new(),
            next: None,
        }
    }

    /// Create a record with every schema default filled in.
    pub fn with_defaults(schema: Arc<EntitySchema>) -> Self {
        let mut record = Self::new(schema);
        record.init();
        record
    }

    /// Fill schema defaults for single-valued fields that are not set yet.
    pub fn init(&mut self) {
        let schema = Arc::clone(&self.schema);
        for slot in schema.slots() {
            let (Some(name), Some(default)) = (slot.field_name(), &slot.default) else {
                continue;
            };
            if slot.multiplicity == Multiplicity::One && !self.fields.contains_key(name) {
                self.fields.insert(name, FieldValue::Single(default.clone()));
            }
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Canonical entity name of the record's schema.
    pub fn entity_name(&self) -> &'static str {
        self.schema.name()
    }

    /// Single value of a field.
    pub fn get(&self, name: &str) -> Option<&GroupValue> {
        self.fields.get(name).and_then(FieldValue::as_single)
    }

    /// Values of a repeated field (a single value reads as a one-item list).
    pub fn get_list(&self, name: &str) -> &[GroupValue] {
        self.fields.get(name).map(FieldValue::as_list).unwrap_or(&[])
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(GroupValue::as_int)
    }

    pub fn get_real(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(GroupValue::as_real)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(GroupValue::as_str)
    }

    /// Set a single-valued field, applying the slot's kind and range checks.
    pub fn set(&mut self, name: &str, value: impl Into<GroupValue>) -> Result<()> {
        let (key, value) = self.checked(name, value.into())?;
        let slot = self.slot_of(key)?;
        if slot.multiplicity == Multiplicity::Many {
            return Err(DxfError::InvariantViolation(format!(
                "field {:?} is repeated; use push",
                key
            )));
        }
        self.fields.insert(key, FieldValue::Single(value));
        Ok(())
    }

    /// Append to a repeated field. Pushing to an element-group leader starts a
    /// new element and pads every member list to the new length.
    pub fn push(&mut self, name: &str, value: impl Into<GroupValue>) -> Result<()> {
        let (key, value) = self.checked(name, value.into())?;
        let slot = self.slot_of(key)?;
        if slot.multiplicity != Multiplicity::Many {
            return Err(DxfError::InvariantViolation(format!(
                "field {:?} is single-valued; use set",
                key
            )));
        }
        if slot.element_of.is_some() {
            return Err(DxfError::InvariantViolation(format!(
                "field {:?} is an element member; use set_element",
                key
            )));
        }
        self.push_unchecked(key, value);
        Ok(())
    }

    /// Replace member `name` of element `index`.
    pub fn set_element(
        &mut self,
        name: &str,
        index: usize,
        value: impl Into<GroupValue>,
    ) -> Result<()> {
        let (key, value) = self.checked(name, value.into())?;
        match self.fields.get_mut(key) {
            Some(FieldValue::List(values)) if index < values.len() => {
                values[index] = value;
                Ok(())
            }
            _ => Err(DxfError::InvariantViolation(format!(
                "field {:?} has no element {}",
                key, index
            ))),
        }
    }

    /// Number of elements in the group led by `leader`.
    pub fn element_count(&self, leader: &str) -> usize {
        self.get_list(leader).len()
    }

    /// Remove a field; it falls back to "absent" (not to its default).
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    /// Whether a field holds a value that is present, not blank and not the
    /// slot default.
    pub fn is_field_set(&self, name: &str) -> bool {
        let Some(field) = self.fields.get(name) else {
            return false;
        };
        match field {
            FieldValue::List(values) => !values.is_empty(),
            FieldValue::Single(value) => {
                let default = self.schema.field_slot(name).and_then(|s| s.default.as_ref());
                !value.is_blank() && default.map_or(true, |d| d != value)
            }
        }
    }

    pub fn graphics_data(&self) -> &LinkedChain<BinaryChunk> {
        &self.graphics_data
    }

    pub fn graphics_data_mut(&mut self) -> &mut LinkedChain<BinaryChunk> {
        &mut self.graphics_data
    }

    pub fn entity_data(&self) -> &LinkedChain<BinaryChunk> {
        &self.entity_data
    }

    pub fn entity_data_mut(&mut self) -> &mut LinkedChain<BinaryChunk> {
        &mut self.entity_data
    }

    pub fn object_ids(&self) -> &LinkedChain<ObjectIdRef> {
        &self.object_ids
    }

    pub fn object_ids_mut(&mut self) -> &mut LinkedChain<ObjectIdRef> {
        &mut self.object_ids
    }

    pub fn chain_is_empty(&self, chain: ChainKind) -> bool {
        match chain {
            ChainKind::GraphicsData => self.graphics_data.is_empty(),
            ChainKind::EntityData => self.entity_data.is_empty(),
            ChainKind::ObjectIds => self.object_ids.is_empty(),
        }
    }

    /// Number of nodes in one of the owned chains.
    pub fn chain_len(&self, chain: ChainKind) -> usize {
        match chain {
            ChainKind::GraphicsData => self.graphics_data.len(),
            ChainKind::EntityData => self.entity_data.len(),
            ChainKind::ObjectIds => self.object_ids.len(),
        }
    }

    pub fn next(&self) -> Option<&EntityRecord> {
        self.next.as_deref()
    }

    pub fn next_mut(&mut self) -> Option<&mut EntityRecord> {
        self.next.as_deref_mut()
    }

    /// Link `next` after this record, returning the previous successor.
    pub fn set_next(&mut self, next: Option<EntityRecord>) -> Option<EntityRecord> {
        std::mem::replace(&mut self.next, next.map(Box::new)).map(|b| *b)
    }

    /// Unlink and return the successor.
    pub fn take_next(&mut self) -> Option<EntityRecord> {
        self.next.take().map(|b| *b)
    }

    /// Append `record` after the last sibling. O(n).
    pub fn append_sibling(&mut self, record: EntityRecord) {
        let mut cursor = &mut self.next;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(Box::new(record));
    }

    /// This record followed by every linked sibling.
    pub fn siblings(&self) -> Siblings<'_> {
        Siblings { next: Some(self) }
    }

    /// Release the record and its chains.
    ///
    /// A record that still links a successor is handed back untouched.
    pub fn free(self) -> std::result::Result<(), FreeError<EntityRecord>> {
        if self.next.is_some() {
            return Err(FreeError {
                reason: "record still links a next sibling",
                record: self,
            });
        }
        drop(self);
        Ok(())
    }

    fn slot_of(&self, name: &str) -> Result<&FieldSlot> {
        self.schema
            .field_slot(name)
            .ok_or_else(|| DxfError::UnknownField {
                entity: self.schema.name().to_string(),
                field: name.to_string(),
            })
    }

    /// Resolve the static field key and run the slot checks on `value`.
    fn checked(&self, name: &str, value: GroupValue) -> Result<(&'static str, GroupValue)> {
        let slot = self.slot_of(name)?;
        let key = slot.field_name().unwrap_or_default();
        let value = match (slot.kind, value) {
            (ValueKind::Real, GroupValue::Integer(v)) => GroupValue::Real(v as f64),
            (_, value) => value,
        };
        if value.kind() != slot.kind {
            return Err(DxfError::KindMismatch {
                field: key.to_string(),
                expected: slot.kind,
                found: value.kind(),
            });
        }
        if let Some(constraint) = slot.constraint {
            if !constraint.accepts(&value) {
                return Err(DxfError::OutOfRange {
                    field: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        // Each value occupies exactly one line of the tag stream
        if let GroupValue::Str(text) = &value {
            if text.contains(['\n', '\r']) {
                return Err(DxfError::OutOfRange {
                    field: key.to_string(),
                    value: format!("{:?}", text),
                });
            }
        }
        Ok((key, value))
    }

    /// Store a single value without checks.
    pub(crate) fn put(&mut self, key: &'static str, value: GroupValue) {
        self.fields.insert(key, FieldValue::Single(value));
    }

    /// Append without checks, padding element members when `key` leads a group.
    pub(crate) fn push_unchecked(&mut self, key: &'static str, value: GroupValue) {
        let list = self
            .fields
            .entry(key)
            .or_insert_with(|| FieldValue::List(Vec::new()));
        if let FieldValue::Single(previous) = list {
            let previous = previous.clone();
            *list = FieldValue::List(vec![previous]);
        }
        if let FieldValue::List(values) = list {
            values.push(value);
        }
        if self.schema.is_element_leader(key) {
            self.pad_elements(key);
        }
    }

    /// Extend every member list of the group led by `leader` to its length.
    pub(crate) fn pad_elements(&mut self, leader: &str) {
        let count = self.element_count(leader);
        let schema = Arc::clone(&self.schema);
        for member in schema.element_members(leader) {
            let Some(name) = member.field_name() else {
                continue;
            };
            let list = self
                .fields
                .entry(name)
                .or_insert_with(|| FieldValue::List(Vec::new()));
            if let FieldValue::List(values) = list {
                while values.len() < count {
                    values.push(member.fill_value());
                }
            }
        }
    }

    /// Overwrite the last element of a member list without checks.
    pub(crate) fn put_last_element(&mut self, key: &'static str, value: GroupValue) -> bool {
        match self.fields.get_mut(key) {
            Some(FieldValue::List(values)) if !values.is_empty() => {
                let last = values.len() - 1;
                values[last] = value;
                true
            }
            _ => false,
        }
    }

    /// Copy of this record without its siblings.
    fn clone_detached(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            fields: self.fields.clone(),
            graphics_data: self.graphics_data.clone(),
            entity_data: self.entity_data.clone(),
            object_ids: self.object_ids.clone(),
            next: None,
        }
    }

    fn eq_detached(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.fields == other.fields
            && self.graphics_data == other.graphics_data
            && self.entity_data == other.entity_data
            && self.object_ids == other.object_ids
    }
}

impl Drop for EntityRecord {
    fn drop(&mut self) {
        // Unlink siblings one by one so long lists do not recurse.
        let mut cursor = self.next.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

impl Clone for EntityRecord {
    fn clone(&self) -> Self {
        let mut head = self.clone_detached();
        let mut tail = &mut head.next;
        let mut source = self.next.as_deref();
        while let Some(node) = source {
            let copy = tail.insert(Box::new(node.clone_detached()));
            tail = &mut copy.next;
            source = node.next.as_deref();
        }
        head
    }
}

impl PartialEq for EntityRecord {
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.siblings();
        let mut b = other.siblings();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x.eq_detached(y) => {}
                _ => return false,
            }
        }
    }
}

impl fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("entity", &self.schema.name())
            .field("fields", &self.fields)
            .field("graphics_data", &self.graphics_data)
            .field("entity_data", &self.entity_data)
            .field("object_ids", &self.object_ids)
            .field("siblings", &(self.siblings().count() - 1))
            .finish()
    }
}

/// Iterator over a record and its linked siblings.
pub struct Siblings<'a> {
    next: Option<&'a EntityRecord>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = &'a EntityRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.next?;
        self.next = record.next.as_deref();
        Some(record)
    }
}

/// A homogeneous list of records of one type, linked through `next`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityList {
    head: Option<EntityRecord>,
    len: usize,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail. O(n).
    pub fn append(&mut self, record: EntityRecord) {
        match &mut self.head {
            Some(head) => head.append_sibling(record),
            None => self.head = Some(record),
        }
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<&EntityRecord> {
        self.head.as_ref()
    }

    pub fn last(&self) -> Option<&EntityRecord> {
        self.iter().last()
    }

    pub fn iter(&self) -> Siblings<'_> {
        Siblings {
            next: self.head.as_ref(),
        }
    }

    /// Unlink every record from its successor and free it.
    pub fn free_all(mut self) -> Result<()> {
        let mut cursor = self.head.take();
        while let Some(mut record) = cursor {
            cursor = record.take_next();
            record.free()?;
        }
        Ok(())
    }
}

impl EntityList {
    fn tail_mut(&mut self) -> Option<&mut EntityRecord> {
        let mut node = self.head.as_mut()?;
        while node.next.is_some() {
            node = node.next.as_deref_mut()?;
        }
        Some(node)
    }
}

/// Links a whole batch after the current tail, walking the list once.
impl Extend<EntityRecord> for EntityList {
    fn extend<I: IntoIterator<Item = EntityRecord>>(&mut self, iter: I) {
        let EntityList { head, len } = iter.into_iter().collect();
        let Some(head) = head else {
            return;
        };
        self.len += len;
        match self.tail_mut() {
            Some(tail) => {
                tail.set_next(Some(head));
            }
            None => self.head = Some(head),
        }
    }
}

impl<'a> IntoIterator for &'a EntityList {
    type Item = &'a EntityRecord;
    type IntoIter = Siblings<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<EntityRecord> for EntityList {
    fn from_iter<I: IntoIterator<Item = EntityRecord>>(iter: I) -> Self {
        // Build back to front so each link is made once.
        let mut records: Vec<EntityRecord> = iter.into_iter().collect();
        let len = records.len();
        let mut head: Option<EntityRecord> = None;
        while let Some(mut record) = records.pop() {
            record.set_next(head.take());
            head = Some(record);
        }
        Self { head, len }
    }
}
