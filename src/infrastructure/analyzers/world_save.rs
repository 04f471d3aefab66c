//! World download inspection via its `level.dat` descriptor.

use std::path::Path;

use tracing::{debug, warn};

use crate::domain::entities::WorldSaveMeta;
use crate::infrastructure::archive::find_entry_by_name;
use crate::infrastructure::nbt::{self, Tag};

/// Descriptor looked up inside world archives.
pub const LEVEL_DESCRIPTOR: &str = "level.dat";

/// Inspects the world archive at `path`.
///
/// Returns `None` when the archive has no descriptor. Safety violations and
/// unreadable descriptors come back as `Failed` carrying the error text.
#[must_use]
pub fn read_world_save(path: &Path) -> Option<WorldSaveMeta> {
    let descriptor = match find_entry_by_name(path, LEVEL_DESCRIPTOR) {
        Ok(Some(descriptor)) => descriptor,
        Ok(None) => {
            debug!(path = %path.display(), "No level.dat in archive");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read world archive");
            return Some(WorldSaveMeta::Failed {
                error: e.to_string(),
            });
        }
    };

    match nbt::parse(&descriptor) {
        Ok(named) => Some(describe_level(&named.tag)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse level.dat");
            Some(WorldSaveMeta::Failed {
                error: e.to_string(),
            })
        }
    }
}

/// Walks root → `Data` → `Version` → `Name`, checking each tag's kind.
#[must_use]
pub fn describe_level(root: &Tag) -> WorldSaveMeta {
    let name = root
        .as_compound()
        .and_then(|root| root.get("Data"))
        .and_then(Tag::as_compound)
        .and_then(|data| data.get("Version"))
        .and_then(Tag::as_compound)
        .and_then(|version| version.get("Name"))
        .and_then(Tag::as_str)
        .filter(|name| !name.is_empty());

    match name {
        Some(name) => WorldSaveMeta::Parsed {
            version: name.to_string(),
        },
        None => WorldSaveMeta::invalid(),
    }
}
