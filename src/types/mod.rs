//! Core value types shared by the reader, writer and codec

mod binary_chunk;
mod handle;
mod object_id;
mod value;
mod version;

pub use binary_chunk::{BinaryChunk, BYTES_PER_CHUNK, MAX_CHUNK_LENGTH};
pub use handle::Handle;
pub use object_id::{ObjectIdKind, ObjectIdRef};
pub use value::{GroupValue, ValueKind};
pub use version::DxfVersion;
