//! Lookup of schemas by the entity name found after a `0` group code

use super::{EntitySchema, RecordKind};
use crate::{entities, objects, tables};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Name-indexed set of schemas.
///
/// Names are matched case-insensitively, and every version-specific alias a
/// schema declares resolves to the same table.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    by_name: AHashMap<String, Arc<EntitySchema>>,
    ordered: Vec<Arc<EntitySchema>>,
}

static BUILTIN: Lazy<Arc<SchemaRegistry>> = Lazy::new(|| {
    let mut registry = SchemaRegistry::new();
    registry.register(entities::insert::schema());
    registry.register(entities::light::schema());
    registry.register(entities::proxy_entity::schema());
    registry.register(objects::spatial_index::schema());
    registry.register(tables::linetype::schema());
    Arc::new(registry)
});

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every schema the crate ships with.
    pub fn builtin() -> Arc<SchemaRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Add `schema` under its name and aliases, replacing any schema that
    /// already claimed one of them.
    ///
    /// A replaced schema is dropped entirely, aliases included.
    pub fn register(&mut self, schema: Arc<EntitySchema>) {
        let displaced: Vec<Arc<EntitySchema>> = schema
            .names()
            .filter_map(|name| self.by_name.get(&name.to_ascii_uppercase()).cloned())
            .collect();
        for previous in &displaced {
            self.by_name.retain(|_, s| !Arc::ptr_eq(s, previous));
            self.ordered.retain(|s| !Arc::ptr_eq(s, previous));
        }
        for name in schema.names() {
            self.by_name.insert(name.to_ascii_uppercase(), Arc::clone(&schema));
        }
        self.ordered.push(schema);
    }

    /// Schema for an entity name as it appears in the stream.
    pub fn get(&self, name: &str) -> Option<&Arc<EntitySchema>> {
        self.by_name.get(&name.trim().to_ascii_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntitySchema>> + '_ {
        self.ordered.iter()
    }

    /// Schemas whose records belong to section `kind`.
    pub fn of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &Arc<EntitySchema>> + '_ {
        self.ordered.iter().filter(move |s| s.kind() == kind)
    }

    /// Schema of the entries of symbol table `table`.
    pub fn table_entry(&self, table: &str) -> Option<&Arc<EntitySchema>> {
        self.ordered.iter().find(|s| match s.kind() {
            RecordKind::TableEntry(name) => name.eq_ignore_ascii_case(table),
            _ => false,
        })
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
