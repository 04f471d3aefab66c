//! Data version to release id lookup.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, error};

use super::error::{AnalysisError, AnalysisResult};

/// Release id reported for data versions missing from the table.
pub const UNKNOWN_VERSION: &str = "Unknown";

const BUILTIN_VERSIONS: &str = include_str!("versions.json");

#[derive(Debug, Deserialize)]
struct VersionEntry {
    id: String,
    data_version: i32,
}

/// Exact-match map from world data version to release id.
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    releases: HashMap<i32, String>,
}

impl VersionTable {
    /// Table bundled with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_VERSIONS).unwrap_or_else(|e| {
            error!(error = %e, "Bundled version table is invalid");
            Self::default()
        })
    }

    /// Parses a `[{ "id": .., "data_version": .. }]` list.
    ///
    /// # Errors
    /// Returns error if the JSON does not have that shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<VersionEntry> = serde_json::from_str(json)?;
        let mut table = Self::default();
        table.extend(entries);
        Ok(table)
    }

    /// Builtin table with entries from `path` layered on top.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn with_overrides(path: &Path) -> AnalysisResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let entries: Vec<VersionEntry> =
            serde_json::from_str(&json).map_err(|e| AnalysisError::version_table(path, e))?;

        debug!(path = %path.display(), count = entries.len(), "Loaded version overrides");

        let mut table = Self::builtin();
        table.extend(entries);
        Ok(table)
    }

    fn extend(&mut self, entries: Vec<VersionEntry>) {
        for entry in entries {
            self.releases.insert(entry.data_version, entry.id);
        }
    }

    /// Release id for `data_version`, or [`UNKNOWN_VERSION`].
    #[must_use]
    pub fn release_name(&self, data_version: i32) -> &str {
        self.releases
            .get(&data_version)
            .map_or(UNKNOWN_VERSION, String::as_str)
    }

    /// Number of known versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Returns whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
