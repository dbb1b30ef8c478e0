//! DXF format versions
//!
//! Versions are ordered so that gating rules can be written as plain range
//! comparisons (`version >= DxfVersion::R14`).

use std::fmt;

/// AutoCAD release a DXF file claims to conform to.
///
/// R11 and R12 share the `AC1009` header string. They are kept apart because
/// a few fields (group 38 elevation) stop being written after R11; a file that
/// declares `AC1009` is read as R12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DxfVersion {
    /// No `$ACADVER` seen. Reading applies no gating, writing is refused.
    #[default]
    Unknown,
    /// AutoCAD Release 9
    R9,
    /// AutoCAD Release 10
    R10,
    /// AutoCAD Release 11
    R11,
    /// AutoCAD Release 12
    R12,
    /// AutoCAD Release 13
    R13,
    /// AutoCAD Release 14
    R14,
    /// AutoCAD 2000
    R2000,
    /// AutoCAD 2004
    R2004,
    /// AutoCAD 2007
    R2007,
    /// AutoCAD 2010
    R2010,
    /// AutoCAD 2013
    R2013,
    /// AutoCAD 2018
    R2018,
}

impl DxfVersion {
    /// Every known version, oldest first.
    pub const ALL: [DxfVersion; 12] = [
        DxfVersion::R9,
        DxfVersion::R10,
        DxfVersion::R11,
        DxfVersion::R12,
        DxfVersion::R13,
        DxfVersion::R14,
        DxfVersion::R2000,
        DxfVersion::R2004,
        DxfVersion::R2007,
        DxfVersion::R2010,
        DxfVersion::R2013,
        DxfVersion::R2018,
    ];

    /// Oldest version the codec knows about
    pub const OLDEST: DxfVersion = DxfVersion::R9;

    /// Parse a `$ACADVER` header value (`AC1015`, ...).
    pub fn from_version_string(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "AC1004" => DxfVersion::R9,
            "AC1006" => DxfVersion::R10,
            "AC1009" => DxfVersion::R12,
            "AC1012" => DxfVersion::R13,
            "AC1014" => DxfVersion::R14,
            "AC1015" => DxfVersion::R2000,
            "AC1018" => DxfVersion::R2004,
            "AC1021" => DxfVersion::R2007,
            "AC1024" => DxfVersion::R2010,
            "AC1027" => DxfVersion::R2013,
            "AC1032" => DxfVersion::R2018,
            _ => DxfVersion::Unknown,
        }
    }

    /// The `$ACADVER` string written for this version.
    pub fn as_version_string(&self) -> &'static str {
        match self {
            DxfVersion::Unknown => "AC1015",
            DxfVersion::R9 => "AC1004",
            DxfVersion::R10 => "AC1006",
            DxfVersion::R11 | DxfVersion::R12 => "AC1009",
            DxfVersion::R13 => "AC1012",
            DxfVersion::R14 => "AC1014",
            DxfVersion::R2000 => "AC1015",
            DxfVersion::R2004 => "AC1018",
            DxfVersion::R2007 => "AC1021",
            DxfVersion::R2010 => "AC1024",
            DxfVersion::R2013 => "AC1027",
            DxfVersion::R2018 => "AC1032",
        }
    }

    /// Whether a `$ACADVER` value was recognized.
    pub fn is_known(&self) -> bool {
        *self != DxfVersion::Unknown
    }

    /// Whether text in this version is always UTF-8 (R2007 and later).
    pub fn is_unicode(&self) -> bool {
        *self >= DxfVersion::R2007
    }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DxfVersion::Unknown => "unknown",
            DxfVersion::R9 => "R9",
            DxfVersion::R10 => "R10",
            DxfVersion::R11 => "R11",
            DxfVersion::R12 => "R12",
            DxfVersion::R13 => "R13",
            DxfVersion::R14 => "R14",
            DxfVersion::R2000 => "R2000",
            DxfVersion::R2004 => "R2004",
            DxfVersion::R2007 => "R2007",
            DxfVersion::R2010 => "R2010",
            DxfVersion::R2013 => "R2013",
            DxfVersion::R2018 => "R2018",
        };
        f.write_str(name)
    }
}
