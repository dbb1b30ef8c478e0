//! Graphical entity tables
//!
//! Each module builds the field table of one entity type and exposes it as
//! `schema()`, plus `new_record()` for a record with the table defaults.

pub mod common;
pub mod insert;
pub mod light;
pub mod proxy_entity;

pub use common::{OwnerRule, ENTITY_SUBCLASS};
