//! Symbol table entries (TABLES section)
//!
//! Each table is framed by a `0/TABLE` header carrying the table name and
//! entry count, and closed by `0/ENDTAB`. Only line types have a field table
//! here; other tables are skipped by the reader.

pub mod linetype;

pub use linetype::{LineTypeElement, LineTypeElementFlags, LineTypeFlags};

/// Subclass marker of a table header
pub const TABLE_SUBCLASS: &str = "AcDbSymbolTable";

/// Entity name that opens a table
pub const TABLE_START: &str = "TABLE";

/// Entity name that closes a table
pub const TABLE_END: &str = "ENDTAB";
