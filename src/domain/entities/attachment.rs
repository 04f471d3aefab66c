//! Submission attachment record.

use serde::{Deserialize, Serialize};

use super::AttachmentMetadata;
use crate::domain::services::file_key;

/// Where an attachment's content is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Discord CDN or a native message upload.
    Discord,
    /// MediaFire file or folder link.
    Mediafire,
    /// YouTube video link.
    Youtube,
    /// Bilibili video link.
    Bilibili,
    /// Anything else.
    #[default]
    Unknown,
}

impl ContentType {
    /// Label used in generated descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Discord => "DiscordCDN",
            Self::Mediafire => "MediaFire",
            Self::Youtube => "YouTube",
            Self::Bilibili => "Bilibili",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference to externally or internally hosted submission content.
///
/// `id` is unique within a record set. `path` is only set once the bytes are
/// materialized locally and holds the file key relative to the attachment
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    id: String,
    name: String,
    content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    url: String,
    description: String,
    can_download: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<AttachmentMetadata>,
}

#[allow(missing_docs)]
impl Attachment {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content_type: ContentType,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content_type,
            mime_type: None,
            url: url.into(),
            description: String::new(),
            can_download: false,
            path: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn with_can_download(mut self, can_download: bool) -> Self {
        self.can_download = can_download;
        self
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn can_download(&self) -> bool {
        self.can_download
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&AttachmentMetadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: AttachmentMetadata) {
        self.metadata = Some(metadata);
    }

    /// Lowercased extension of the display name, if it has one.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }

    /// On-disk name for this attachment.
    #[must_use]
    pub fn file_key(&self) -> String {
        file_key(&self.id, &self.name, None)
    }

    /// Whether this is a downloadable picture rather than a submission file.
    #[must_use]
    pub fn is_image(&self) -> bool {
        if !self.can_download {
            return false;
        }
        if let Some(mime) = &self.mime_type {
            return mime.starts_with("image/");
        }
        self.extension()
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
