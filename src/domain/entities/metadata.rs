//! Format-specific metadata attached to submission files.
//!
//! Every analyzer produces its own variant. Content errors are carried as data
//! (`Failed`) so one corrupt upload never aborts the rest of a submission.

use serde::{Deserialize, Serialize};

/// Result of reading a litematic schematic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LitematicMeta {
    /// Schematic parsed successfully.
    Parsed {
        /// Bounding box, formatted `"WxHxD"`.
        size: String,
        /// Release id resolved from the data version, or `"Unknown"`.
        version: String,
    },
    /// Schematic could not be read.
    Failed {
        /// Human readable reason.
        error: String,
    },
}

/// Result of reading a world download's `level.dat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorldSaveMeta {
    /// Descriptor parsed successfully.
    Parsed {
        /// `Data.Version.Name` from the descriptor.
        version: String,
    },
    /// Descriptor missing required keys or unreadable.
    Failed {
        /// Human readable reason.
        error: String,
    },
}

impl WorldSaveMeta {
    /// Error text used whenever the descriptor tree has the wrong shape.
    pub const INVALID_DESCRIPTOR: &'static str = "Invalid descriptor";

    /// Creates the invalid-descriptor variant.
    #[must_use]
    pub fn invalid() -> Self {
        Self::Failed {
            error: Self::INVALID_DESCRIPTOR.to_string(),
        }
    }
}

/// oEmbed details for a linked video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct VideoMeta {
    pub title: String,
    pub author_name: String,
    pub author_url: String,
    pub thumbnail_url: String,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub width: u32,
    pub height: u32,
}

/// Metadata extracted for an attachment; at most one kind per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentMetadata {
    /// Litematic schematic details.
    Litematic(LitematicMeta),
    /// World download details.
    WorldSave(WorldSaveMeta),
    /// Linked video details.
    Video(VideoMeta),
}

impl AttachmentMetadata {
    /// Returns the error text carried by a failed analysis, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Litematic(LitematicMeta::Failed { error })
            | Self::WorldSave(WorldSaveMeta::Failed { error }) => Some(error),
            Self::Litematic(LitematicMeta::Parsed { .. })
            | Self::WorldSave(WorldSaveMeta::Parsed { .. })
            | Self::Video(_) => None,
        }
    }
}
