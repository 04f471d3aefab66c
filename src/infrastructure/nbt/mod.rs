//! Java edition NBT decoding.
//!
//! Big-endian named binary tags, optionally wrapped in gzip or zlib.

mod error;
mod reader;
mod tag;
#[cfg(test)]
pub mod writer;

pub use error::{NbtError, NbtResult};
pub use reader::{MAX_DEPTH, MAX_DECOMPRESSED_SIZE, parse, parse_uncompressed};
pub use tag::{Compound, NamedTag, Tag, TagKind};
