//! Single-pass zip entry walk with traversal and size checks.
//!
//! Entries are inspected from the central directory one at a time; only the
//! matched entry's stream is ever opened. Checks run in a fixed order for each
//! entry: path traversal, directory skip, size ceiling, then the caller's name
//! match. The size check comes before the name match, so an oversized entry
//! aborts the read even when it is not the one being searched for.

use std::fs::File;
use std::io::{BufReader, Read};
use std::iter::FusedIterator;
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use super::error::{ArchiveError, ArchiveResult};

/// Largest uncompressed entry that will be accepted (100 MiB).
pub const MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// A safe, non-directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the central directory.
    pub index: usize,
    /// Normalized forward-slash path.
    pub path: String,
    /// Declared uncompressed size.
    pub size: u64,
}

impl ArchiveEntry {
    /// Final path component.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Normalizes an entry name to relative forward-slash form.
///
/// Returns `None` when the name is absolute or climbs above the archive root.
#[must_use]
pub fn normalize_entry_path(raw: &str) -> Option<String> {
    let unified = raw.replace('\\', "/");

    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return None;
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            segment => parts.push(segment),
        }
    }

    let mut normalized = parts.join("/");
    if unified.ends_with('/') && !normalized.is_empty() {
        normalized.push('/');
    }
    Some(normalized)
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lazy, finite and non-restartable walk over an archive's entries.
///
/// Directories are skipped. The first safety violation is yielded as an error
/// and ends the walk.
pub struct ArchiveEntries {
    archive: ZipArchive<BufReader<File>>,
    next_index: usize,
    limit: u64,
    finished: bool,
}

impl ArchiveEntries {
    /// Opens the archive at `path` and reads its central directory.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or is not a zip archive.
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;

        debug!(path = %path.display(), entries = archive.len(), "Opened archive");

        Ok(Self {
            archive,
            next_index: 0,
            limit: MAX_ENTRY_SIZE,
            finished: false,
        })
    }

    /// Overrides the per-entry size ceiling.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Reads the full content of `entry`.
    ///
    /// At most `limit + 1` bytes are pulled from the stream, so an entry whose
    /// header understates its size is still caught.
    ///
    /// # Errors
    /// Returns `EntrySizeExceeded` if the stream is longer than the ceiling,
    /// or an I/O or zip error if the stream cannot be read.
    pub fn read(&mut self, entry: &ArchiveEntry) -> ArchiveResult<Vec<u8>> {
        let file = self.archive.by_index(entry.index)?;

        let capacity = usize::try_from(entry.size.min(self.limit)).unwrap_or_default();
        let mut buffer = Vec::with_capacity(capacity);
        file.take(self.limit.saturating_add(1))
            .read_to_end(&mut buffer)?;

        let read = buffer.len() as u64;
        if read > self.limit {
            warn!(entry = %entry.path, "Entry stream exceeds declared size");
            return Err(ArchiveError::entry_size_exceeded(&entry.path, read, self.limit));
        }

        Ok(buffer)
    }

    fn inspect(&mut self, index: usize) -> ArchiveResult<Option<ArchiveEntry>> {
        let file = self.archive.by_index_raw(index)?;
        let raw_name = file.name().to_string();

        let Some(path) = normalize_entry_path(&raw_name) else {
            warn!(entry = %raw_name, "Rejecting archive with path traversal");
            return Err(ArchiveError::path_traversal(raw_name));
        };

        if file.is_dir() || path.is_empty() || path.ends_with('/') {
            return Ok(None);
        }

        let size = file.size();
        if size > self.limit {
            warn!(entry = %raw_name, size, "Rejecting archive with oversized entry");
            return Err(ArchiveError::entry_size_exceeded(raw_name, size, self.limit));
        }

        Ok(Some(ArchiveEntry { index, path, size }))
    }
}

impl Iterator for ArchiveEntries {
    type Item = ArchiveResult<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if self.next_index >= self.archive.len() {
                self.finished = true;
                break;
            }

            let index = self.next_index;
            self.next_index += 1;

            match self.inspect(index) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl FusedIterator for ArchiveEntries {}

/// Returns the bytes of the first entry whose base name is `base_name`.
///
/// `Ok(None)` means the archive was walked completely without a match.
///
/// # Errors
/// Returns a safety violation or I/O error; see [`ArchiveEntries`].
pub fn find_entry_by_name(path: &Path, base_name: &str) -> ArchiveResult<Option<Vec<u8>>> {
    find_entry_by_name_with_limit(path, base_name, MAX_ENTRY_SIZE)
}

/// Same as [`find_entry_by_name`] with an explicit size ceiling.
///
/// # Errors
/// Returns a safety violation or I/O error; see [`ArchiveEntries`].
pub fn find_entry_by_name_with_limit(
    path: &Path,
    base_name: &str,
    limit: u64,
) -> ArchiveResult<Option<Vec<u8>>> {
    let mut entries = ArchiveEntries::open(path)?.with_limit(limit);

    while let Some(entry) = entries.next() {
        let entry = entry?;
        if entry.base_name() == base_name {
            debug!(entry = %entry.path, "Found archive entry");
            return entries.read(&entry).map(Some);
        }
    }

    Ok(None)
}
