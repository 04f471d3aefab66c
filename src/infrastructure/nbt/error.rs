use std::io;

use thiserror::Error;

use super::tag::TagKind;

/// Result alias for NBT decoding.
pub type NbtResult<T> = Result<T, NbtError>;

/// Malformed or hostile NBT payloads.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum NbtError {
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("unknown tag id {id} at offset {offset}")]
    UnknownTag { id: u8, offset: usize },

    #[error("root tag must not be {kind:?}")]
    InvalidRoot { kind: TagKind },

    #[error("negative length {length} at offset {offset}")]
    NegativeLength { length: i32, offset: usize },

    #[error("list of {kind:?} with {length} elements")]
    InvalidList { kind: TagKind, length: i32 },

    #[error("nesting deeper than {limit} levels")]
    DepthExceeded { limit: usize },

    #[error("decompressed payload exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("decompression failed: {0}")]
    Decompression(#[from] io::Error),
}
