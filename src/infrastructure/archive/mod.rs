//! Bounded, traversal-safe zip reading.

mod error;
mod secure_reader;

pub use error::{ArchiveError, ArchiveResult};
pub use secure_reader::{
    ArchiveEntries, ArchiveEntry, MAX_ENTRY_SIZE, find_entry_by_name, find_entry_by_name_with_limit,
    normalize_entry_path,
};
