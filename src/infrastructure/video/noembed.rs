//! noembed.com oEmbed proxy client.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::entities::VideoMeta;
use crate::domain::errors::TransportError;
use crate::domain::ports::VideoMetadataPort;

/// Default lookup endpoint; the escaped video URL is appended.
pub const NOEMBED_ENDPOINT: &str = "https://noembed.com/embed?dataType=json&url=";

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Raw noembed body. Every field may be absent, null, empty or of the wrong
/// type; a bad field falls back on its own without failing the body.
#[derive(Debug, Default, Deserialize)]
struct NoEmbedResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    author_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    author_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    thumbnail_width: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    thumbnail_height: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    width: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    height: Option<u32>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Accepts integers, floats (truncated) and numeric strings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl From<NoEmbedResponse> for VideoMeta {
    fn from(body: NoEmbedResponse) -> Self {
        Self {
            title: non_empty_or(body.title, UNKNOWN_TITLE),
            author_name: non_empty_or(body.author_name, UNKNOWN_AUTHOR),
            author_url: body.author_url.unwrap_or_default(),
            thumbnail_url: body.thumbnail_url.unwrap_or_default(),
            thumbnail_width: body.thumbnail_width.unwrap_or_default(),
            thumbnail_height: body.thumbnail_height.unwrap_or_default(),
            width: body.width.unwrap_or_default(),
            height: body.height.unwrap_or_default(),
        }
    }
}

/// Video metadata client backed by noembed.
pub struct NoEmbedClient {
    client: Client,
    endpoint: String,
}

impl NoEmbedClient {
    /// Creates client for `endpoint`, which must end where the URL is appended.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn lookup_url(&self, video_url: &str) -> String {
        format!(
            "{}{}",
            self.endpoint,
            utf8_percent_encode(video_url, NON_ALPHANUMERIC)
        )
    }
}

#[async_trait]
impl VideoMetadataPort for NoEmbedClient {
    async fn fetch_video_metadata(&self, url: &str) -> Result<VideoMeta, TransportError> {
        debug!(url = %url, "Fetching video details");

        let response = self
            .client
            .get(self.lookup_url(url))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "Video lookup request failed");
                if e.is_timeout() {
                    TransportError::network("request timed out")
                } else {
                    TransportError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::status(status.as_u16(), format!("HTTP {status}")));
        }

        let body: NoEmbedResponse = response.json().await.map_err(|e| {
            TransportError::invalid_response(format!("failed to parse response: {e}"))
        })?;

        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url_escapes_video_url() {
        let client = NoEmbedClient::new(NOEMBED_ENDPOINT, Duration::from_secs(5)).unwrap();

        assert_eq!(
            client.lookup_url("https://youtu.be/abc?t=1"),
            "https://noembed.com/embed?dataType=json&url=https%3A%2F%2Fyoutu%2Ebe%2Fabc%3Ft%3D1"
        );
    }

    #[test]
    fn test_fallbacks_for_missing_fields() {
        let body: NoEmbedResponse =
            serde_json::from_str(r#"{"error": "no matching providers found", "title": ""}"#)
                .unwrap();
        let meta = VideoMeta::from(body);

        assert_eq!(meta.title, "Unknown Title");
        assert_eq!(meta.author_name, "Unknown Author");
        assert_eq!(meta.author_url, "");
        assert_eq!(meta.thumbnail_width, 0);
        assert_eq!(meta.height, 0);
    }

    #[test]
    fn test_malformed_fields_fall_back_individually() {
        let body: NoEmbedResponse = serde_json::from_str(
            r#"{
                "title": "Farm",
                "author_name": 42,
                "width": 200.5,
                "height": "113",
                "thumbnail_width": null,
                "thumbnail_height": "abc"
            }"#,
        )
        .unwrap();
        let meta = VideoMeta::from(body);

        assert_eq!(meta.title, "Farm");
        assert_eq!(meta.author_name, "Unknown Author");
        assert_eq!(meta.width, 200);
        assert_eq!(meta.height, 113);
        assert_eq!(meta.thumbnail_width, 0);
        assert_eq!(meta.thumbnail_height, 0);
    }

    #[test]
    fn test_full_response() {
        let body: NoEmbedResponse = serde_json::from_str(
            r#"{
                "title": "Ultimate Farm",
                "author_name": "Builder",
                "author_url": "https://www.youtube.com/@builder",
                "thumbnail_url": "https://i.ytimg.com/vi/abc/hqdefault.jpg",
                "thumbnail_width": 480,
                "thumbnail_height": 360,
                "width": 200,
                "height": 113,
                "html": "<iframe></iframe>"
            }"#,
        )
        .unwrap();
        let meta = VideoMeta::from(body);

        assert_eq!(meta.title, "Ultimate Farm");
        assert_eq!(meta.thumbnail_width, 480);
        assert_eq!(meta.width, 200);
    }
}
