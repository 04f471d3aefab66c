//! Submission image record.

use serde::{Deserialize, Serialize};

use super::Attachment;
use crate::domain::services::file_key;

/// Extension every processed image is stored under.
pub const PROCESSED_EXTENSION: &str = "png";

/// Image attached to a submission.
///
/// `width`/`height` are only known after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    id: String,
    name: String,
    description: String,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
}

#[allow(missing_docs)]
impl Image {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            url: url.into(),
            path: None,
            width: None,
            height: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
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
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub const fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }

    /// Records the processed file and its final size.
    pub fn set_processed(&mut self, path: impl Into<String>, width: u32, height: u32) {
        self.path = Some(path.into());
        self.width = Some(width);
        self.height = Some(height);
    }

    /// Name of the raw download in the staging directory.
    #[must_use]
    pub fn download_key(&self) -> String {
        file_key(&self.id, &self.name, None)
    }

    /// Name of the processed PNG in the output directory.
    #[must_use]
    pub fn processed_key(&self) -> String {
        file_key(&self.id, &self.name, Some(PROCESSED_EXTENSION))
    }
}

impl From<&Attachment> for Image {
    fn from(attachment: &Attachment) -> Self {
        Self::new(attachment.id(), attachment.name(), attachment.url())
            .with_description(attachment.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let image = Image::new("42", "Front View.JPG", "https://x");
        assert_eq!(image.download_key(), "42-front%20view.jpg");
        assert_eq!(image.processed_key(), "42-front%20view.png");
    }

    #[test]
    fn test_dimensions_only_after_processing() {
        let mut image = Image::new("1", "a.png", "https://x");
        assert_eq!(image.dimensions(), None);

        image.set_processed("1-a.png", 800, 600);
        assert_eq!(image.dimensions(), Some((800, 600)));
    }
}
