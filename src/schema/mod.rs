//! Entity schemas
//!
//! An [`EntitySchema`] is the field table of one entity or object type: the
//! ordered list of [`FieldSlot`]s the writer walks, plus a group-code index the
//! reader dispatches through. Concrete entity modules only build tables; the
//! decode/encode loops live in [`crate::codec`].

mod registry;
mod slot;

pub use registry::SchemaRegistry;
pub use slot::{ChainKind, Constraint, FieldSlot, Multiplicity, SlotTarget, WritePredicate};

use crate::error::{DxfError, Result};
use crate::types::{DxfVersion, GroupValue, ValueKind};
use ahash::AHashMap;
use std::collections::hash_map::Entry;

/// Which file section records of a schema live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Graphical entity (ENTITIES section)
    Entity,
    /// Non-graphical object (OBJECTS section)
    Object,
    /// Symbol table entry (TABLES section); holds the table name
    TableEntry(&'static str),
}

/// The field table of one entity/object type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: &'static str,
    kind: RecordKind,
    /// `(before, name)`: records are named `name` when written for a version
    /// older than `before`. Sorted by `before`.
    earlier_names: Vec<(DxfVersion, &'static str)>,
    slots: Vec<FieldSlot>,
    dispatch: AHashMap<i32, Vec<usize>>,
}

impl EntitySchema {
    /// Start a schema named `name` (the name used by the newest versions).
    pub fn builder(name: &'static str, kind: RecordKind) -> SchemaBuilder {
        SchemaBuilder {
            name,
            kind,
            earlier_names: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Name written by current versions.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Every name records of this schema may carry on the wire.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.earlier_names.iter().map(|(_, n)| *n))
    }

    /// Name line to write for `version`.
    pub fn entity_name(&self, version: DxfVersion) -> &'static str {
        self.earlier_names
            .iter()
            .find(|(before, _)| version < *before)
            .map(|(_, name)| *name)
            .unwrap_or(self.name)
    }

    /// Whether `name` is one of this schema's names (case-insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        self.names().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Slots in declaration (write) order.
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> &FieldSlot {
        &self.slots[index]
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Indices of the slots that accept `code`, in declaration order.
    pub fn slots_for_code(&self, code: i32) -> &[usize] {
        self.dispatch.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First slot targeting field `name`.
    pub fn field_slot(&self, name: &str) -> Option<&FieldSlot> {
        self.slots.iter().find(|s| s.field_name() == Some(name))
    }

    /// Distinct field names in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for name in self.slots.iter().filter_map(FieldSlot::field_name) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Subclass markers this type may carry (the group-100 allow-list).
    pub fn subclasses(&self) -> impl Iterator<Item = &str> + '_ {
        self.constants_for(100).filter_map(GroupValue::as_str)
    }

    /// Fixed values declared for `code` (markers, braces, terminators).
    pub fn constants_for(&self, code: i32) -> impl Iterator<Item = &GroupValue> + '_ {
        self.slots_for_code(code)
            .iter()
            .filter_map(move |&i| match &self.slots[i].target {
                SlotTarget::Constant(value) => Some(value),
                _ => None,
            })
    }

    /// Member slots of the element group led by field `leader`.
    pub fn element_members(&self, leader: &str) -> impl Iterator<Item = &FieldSlot> + '_ {
        let leader = leader.to_string();
        self.slots
            .iter()
            .filter(move |s| s.element_of.map_or(false, |l| l == leader))
    }

    /// Whether field `name` leads an element group.
    pub fn is_element_leader(&self, name: &str) -> bool {
        self.slots.iter().any(|s| s.element_of == Some(name))
    }

    /// Check the table for internal consistency: a group code maps to a
    /// single value kind, element members name an existing leader, and the
    /// table is not empty.
    pub fn validate(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(DxfError::InvariantViolation(format!(
                "schema {} has no slots",
                self.name
            )));
        }
        let mut kinds: AHashMap<i32, ValueKind> = AHashMap::new();
        for slot in &self.slots {
            match kinds.entry(slot.code) {
                Entry::Occupied(e) if *e.get() != slot.kind => {
                    return Err(DxfError::InvariantViolation(format!(
                        "schema {}: group code {} declared as both {} and {}",
                        self.name,
                        slot.code,
                        e.get(),
                        slot.kind
                    )));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(e) => {
                    e.insert(slot.kind);
                }
            }
            if let Some(leader) = slot.element_of {
                let leader_slot = self.field_slot(leader);
                if leader_slot.map_or(true, |s| s.multiplicity != Multiplicity::Many) {
                    return Err(DxfError::InvariantViolation(format!(
                        "schema {}: element member {:?} has no repeated leader {:?}",
                        self.name,
                        slot.field_name(),
                        leader
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`EntitySchema`].
pub struct SchemaBuilder {
    name: &'static str,
    kind: RecordKind,
    earlier_names: Vec<(DxfVersion, &'static str)>,
    slots: Vec<FieldSlot>,
}

impl SchemaBuilder {
    /// Use `name` when writing versions older than `before`.
    pub fn named_before(mut self, before: DxfVersion, name: &'static str) -> Self {
        self.earlier_names.push((before, name));
        self
    }

    pub fn slot(mut self, slot: FieldSlot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn slots(mut self, slots: impl IntoIterator<Item = FieldSlot>) -> Self {
        self.slots.extend(slots);
        self
    }

    pub fn build(self) -> EntitySchema {
        let mut dispatch: AHashMap<i32, Vec<usize>> = AHashMap::new();
        for (index, slot) in self.slots.iter().enumerate() {
            dispatch.entry(slot.code).or_default().push(index);
        }
        let mut earlier_names = self.earlier_names;
        earlier_names.sort_by_key(|(before, _)| *before);
        EntitySchema {
            name: self.name,
            kind: self.kind,
            earlier_names,
            slots: self.slots,
            dispatch,
        }
    }

    /// Build and [`validate`](EntitySchema::validate) the table.
    pub fn try_build(self) -> Result<EntitySchema> {
        let schema = self.build();
        schema.validate()?;
        Ok(schema)
    }
}
