//! Field slots: one row of an entity schema

use crate::record::EntityRecord;
use crate::types::{BinaryChunk, DxfVersion, GroupValue, Handle, ValueKind};
use std::fmt;

/// Which owned chain of a record a slot feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainKind {
    /// Proxy graphics (310 lines in the `AcDbEntity` part)
    GraphicsData,
    /// Proxy entity data (310 lines in the `AcDbProxyEntity` part)
    EntityData,
    /// Object-id references (330/340/350/360)
    ObjectIds,
}

/// Where a decoded value lands.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotTarget {
    /// A named field of the record's field map.
    Field(&'static str),
    /// One of the record's owned chains.
    Chain(ChainKind),
    /// A fixed line (subclass marker, application group brace, terminator).
    /// Nothing is stored on decode; the value is written as is.
    Constant(GroupValue),
}

/// How many times a slot may occur in one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// Always written; a missing value falls back to the default.
    One,
    /// Written when present.
    ZeroOrOne,
    /// Repeated; each occurrence appends.
    Many,
}

/// Decides whether a slot is written, from the record alone.
#[derive(Clone, Copy)]
pub enum WritePredicate {
    Always,
    /// Omit when the value equals the slot default.
    NotDefault,
    /// Omit empty strings, null handles and empty chunks.
    NotBlank,
    /// Emit only when another field holds a non-blank, non-default value.
    FieldSet(&'static str),
    /// Emit only when the given chain has nodes.
    ChainNotEmpty(ChainKind),
    /// Arbitrary rule over the record.
    Custom(fn(&EntityRecord) -> bool),
}

impl fmt::Debug for WritePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePredicate::Always => f.write_str("Always"),
            WritePredicate::NotDefault => f.write_str("NotDefault"),
            WritePredicate::NotBlank => f.write_str("NotBlank"),
            WritePredicate::FieldSet(name) => f.debug_tuple("FieldSet").field(name).finish(),
            WritePredicate::ChainNotEmpty(chain) => {
                f.debug_tuple("ChainNotEmpty").field(chain).finish()
            }
            WritePredicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Range rule mirrored from the per-field validity checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Inclusive integer range
    IntRange(i64, i64),
    /// `>= 0.0`
    NonNegative,
    /// `> 0.0`
    Positive,
}

impl Constraint {
    /// Whether `value` satisfies the rule. Values of a kind the rule does not
    /// speak about pass.
    pub fn accepts(&self, value: &GroupValue) -> bool {
        match (self, value) {
            (Constraint::IntRange(lo, hi), GroupValue::Integer(v)) => lo <= v && v <= hi,
            (Constraint::NonNegative, GroupValue::Real(v)) => *v >= 0.0,
            (Constraint::NonNegative, GroupValue::Integer(v)) => *v >= 0,
            (Constraint::Positive, GroupValue::Real(v)) => *v > 0.0,
            (Constraint::Positive, GroupValue::Integer(v)) => *v > 0,
            _ => true,
        }
    }
}

/// One row of an entity schema.
#[derive(Debug, Clone)]
pub struct FieldSlot {
    pub code: i32,
    pub target: SlotTarget,
    pub kind: ValueKind,
    pub min_version: DxfVersion,
    pub max_version: Option<DxfVersion>,
    pub multiplicity: Multiplicity,
    pub default: Option<GroupValue>,
    pub write: WritePredicate,
    /// Only the n-th (0-based) occurrence of `code` in a record resolves here.
    pub occurrence: Option<usize>,
    /// Only resolves after this subclass marker (not enforced before any marker).
    pub subclass: Option<&'static str>,
    /// Only resolves inside this application group (`{ACAD_REACTORS` ...).
    pub group: Option<&'static str>,
    pub constraint: Option<Constraint>,
    /// Member of the repeating element group led by this field.
    pub element_of: Option<&'static str>,
}

impl FieldSlot {
    fn base(code: i32, target: SlotTarget, kind: ValueKind) -> Self {
        Self {
            code,
            target,
            kind,
            min_version: DxfVersion::OLDEST,
            max_version: None,
            multiplicity: Multiplicity::One,
            default: None,
            write: WritePredicate::Always,
            occurrence: None,
            subclass: None,
            group: None,
            constraint: None,
            element_of: None,
        }
    }

    /// A named field; the value kind follows the group-code range.
    pub fn field(code: i32, name: &'static str) -> Self {
        let kind = ValueKind::from_code(code).unwrap_or(ValueKind::Str);
        Self::base(code, SlotTarget::Field(name), kind)
    }

    /// A repeated value appended to one of the record's chains.
    pub fn chain(code: i32, chain: ChainKind) -> Self {
        let kind = match chain {
            ChainKind::GraphicsData | ChainKind::EntityData => ValueKind::Chunk,
            ChainKind::ObjectIds => ValueKind::HexId,
        };
        let mut slot = Self::base(code, SlotTarget::Chain(chain), kind);
        slot.multiplicity = Multiplicity::Many;
        slot
    }

    /// A fixed line such as `94\n0`.
    pub fn constant(code: i32, value: impl Into<GroupValue>) -> Self {
        let value = value.into();
        let kind = value.kind();
        Self::base(code, SlotTarget::Constant(value), kind)
    }

    /// A subclass marker (`100`).
    pub fn marker(name: &'static str) -> Self {
        Self::constant(100, name)
    }

    /// An application group brace line (`102`).
    pub fn brace(text: &'static str) -> Self {
        Self::constant(102, text)
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn since(mut self, version: DxfVersion) -> Self {
        self.min_version = version;
        self
    }

    pub fn until(mut self, version: DxfVersion) -> Self {
        self.max_version = Some(version);
        self
    }

    pub fn default(mut self, value: impl Into<GroupValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.multiplicity = Multiplicity::ZeroOrOne;
        self
    }

    pub fn many(mut self) -> Self {
        self.multiplicity = Multiplicity::Many;
        self
    }

    pub fn when(mut self, predicate: WritePredicate) -> Self {
        self.write = predicate;
        self
    }

    /// Shorthand for `when(WritePredicate::NotDefault)`.
    pub fn omit_default(self) -> Self {
        self.when(WritePredicate::NotDefault)
    }

    /// Shorthand for an optional field written only when not blank.
    pub fn omit_blank(self) -> Self {
        self.optional().when(WritePredicate::NotBlank)
    }

    pub fn nth(mut self, occurrence: usize) -> Self {
        self.occurrence = Some(occurrence);
        self
    }

    pub fn in_subclass(mut self, subclass: &'static str) -> Self {
        self.subclass = Some(subclass);
        self
    }

    pub fn in_group(mut self, group: &'static str) -> Self {
        self.group = Some(group);
        self
    }

    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Make this slot a member of the element group led by `leader`.
    pub fn element_of(mut self, leader: &'static str) -> Self {
        self.element_of = Some(leader);
        self.multiplicity = Multiplicity::Many;
        self
    }

    /// The field name, for field slots.
    pub fn field_name(&self) -> Option<&'static str> {
        match self.target {
            SlotTarget::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the slot is valid at `version`. `Unknown` accepts every slot.
    pub fn applies_to(&self, version: DxfVersion) -> bool {
        if !version.is_known() {
            return true;
        }
        version >= self.min_version && self.max_version.map_or(true, |max| version <= max)
    }

    /// Value used to keep element lists aligned when an element omits this slot.
    pub fn fill_value(&self) -> GroupValue {
        self.default.clone().unwrap_or_else(|| match self.kind {
            ValueKind::Integer => GroupValue::Integer(0),
            ValueKind::Real => GroupValue::Real(0.0),
            ValueKind::Str => GroupValue::Str(String::new()),
            ValueKind::HexId => GroupValue::HexId(Handle::NULL),
            ValueKind::Chunk => GroupValue::Chunk(BinaryChunk::default()),
        })
    }

    /// Evaluate the write predicate for one candidate value.
    pub fn should_write(&self, record: &EntityRecord, value: Option<&GroupValue>) -> bool {
        match self.write {
            WritePredicate::Always => true,
            WritePredicate::NotDefault => match (value, &self.default) {
                (Some(v), Some(d)) => v != d,
                (Some(_), None) => true,
                (None, _) => false,
            },
            WritePredicate::NotBlank => value.map_or(false, |v| !v.is_blank()),
            WritePredicate::FieldSet(name) => record.is_field_set(name),
            WritePredicate::ChainNotEmpty(chain) => !record.chain_is_empty(chain),
            WritePredicate::Custom(rule) => rule(record),
        }
    }
}
