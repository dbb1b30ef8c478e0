//! Object-id references (group codes 330, 340, 350, 360)

use super::Handle;
use std::fmt;

/// The pointer flavour a reference was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectIdKind {
    /// 330
    SoftPointer,
    /// 340
    HardPointer,
    /// 350
    SoftOwner,
    /// 360
    HardOwner,
}

impl ObjectIdKind {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            330..=339 => Some(ObjectIdKind::SoftPointer),
            340..=349 => Some(ObjectIdKind::HardPointer),
            350..=359 => Some(ObjectIdKind::SoftOwner),
            360..=369 => Some(ObjectIdKind::HardOwner),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ObjectIdKind::SoftPointer => 330,
            ObjectIdKind::HardPointer => 340,
            ObjectIdKind::SoftOwner => 350,
            ObjectIdKind::HardOwner => 360,
        }
    }
}

/// A reference from one record to another, kept in an object-id chain.
///
/// The exact group code is preserved so that codes inside a family
/// (e.g. 331) survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectIdRef {
    pub code: i32,
    pub handle: Handle,
}

impl ObjectIdRef {
    pub fn new(code: i32, handle: Handle) -> Self {
        Self { code, handle }
    }

    pub fn soft_pointer(handle: Handle) -> Self {
        Self::new(330, handle)
    }

    pub fn hard_pointer(handle: Handle) -> Self {
        Self::new(340, handle)
    }

    pub fn soft_owner(handle: Handle) -> Self {
        Self::new(350, handle)
    }

    pub fn hard_owner(handle: Handle) -> Self {
        Self::new(360, handle)
    }

    pub fn kind(&self) -> Option<ObjectIdKind> {
        ObjectIdKind::from_code(self.code)
    }
}

impl fmt::Display for ObjectIdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, self.handle)
    }
}
