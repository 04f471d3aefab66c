use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Message, MessageAttachment, MessageAuthor};
use crate::domain::ports::RefreshedUrl;
use crate::domain::serde_utils::snowflake;

/// Body of `POST /attachments/refresh-urls`.
#[derive(Debug, Serialize)]
pub struct RefreshUrlsRequest<'a> {
    /// Links to renew.
    pub attachment_urls: &'a [String],
}

/// Response of `POST /attachments/refresh-urls`.
#[derive(Debug, Deserialize)]
pub struct RefreshUrlsResponse {
    /// Renewed pairs; entries may be missing.
    pub refreshed_urls: Vec<RefreshedUrlResponse>,
}

/// One renewed pair. Either side may be absent in a malformed response.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct RefreshedUrlResponse {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub refreshed: String,
}

impl From<RefreshedUrlResponse> for RefreshedUrl {
    fn from(value: RefreshedUrlResponse) -> Self {
        Self {
            original: value.original,
            refreshed: value.refreshed,
        }
    }
}

/// Discord API message author.
#[derive(Debug, Deserialize)]
pub struct AuthorResponse {
    /// Discord user ID.
    pub id: String,
    /// Discord username.
    pub username: String,
    /// Whether the user is a bot.
    #[serde(default)]
    pub bot: bool,
}

/// Discord API native upload.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct AttachmentResponse {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Discord API message structure.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct MessageResponse {
    #[serde(with = "snowflake")]
    pub id: u64,
    #[serde(with = "snowflake")]
    pub channel_id: u64,
    pub author: AuthorResponse,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<AttachmentResponse>,
}

impl From<MessageResponse> for Message {
    fn from(payload: MessageResponse) -> Self {
        let author = MessageAuthor::new(payload.author.id, payload.author.username, payload.author.bot);

        let attachments = payload
            .attachments
            .into_iter()
            .map(|a| {
                let mut attachment = MessageAttachment::new(a.id, a.filename, a.size, a.url);
                if let Some(ct) = a.content_type {
                    attachment = attachment.with_content_type(ct);
                }
                attachment
            })
            .collect();

        Self::new(payload.id, payload.channel_id, author, payload.content, payload.timestamp)
            .with_attachments(attachments)
    }
}

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Discord.
    pub message: String,
}

/// Discord API rate limit response.
#[derive(Debug, Deserialize)]
pub struct RateLimitResponse {
    /// Seconds to wait before retrying.
    pub retry_after: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_payload_conversion() {
        let json = r#"{
            "id": "1300000000000000001",
            "channel_id": "1200000000000000000",
            "author": {"id": "42", "username": "alice"},
            "content": "hello",
            "timestamp": "2025-01-02T03:04:05.000000+00:00",
            "attachments": [{
                "id": "555",
                "filename": "farm.litematic",
                "size": 2048,
                "url": "https://cdn.discordapp.com/attachments/1/555/farm.litematic",
                "content_type": "application/octet-stream"
            }]
        }"#;

        let payload: MessageResponse = serde_json::from_str(json).unwrap();
        let message = Message::from(payload);

        assert_eq!(message.id().as_u64(), 1_300_000_000_000_000_001);
        assert!(!message.author().is_bot());
        assert_eq!(message.attachments().len(), 1);
        assert_eq!(message.attachments()[0].filename(), "farm.litematic");
        assert_eq!(
            message.attachments()[0].content_type(),
            Some("application/octet-stream")
        );
    }

    #[test]
    fn test_refresh_response_tolerates_missing_fields() {
        let json = r#"{"refreshed_urls": [{"original": "a"}, {"original": "b", "refreshed": "c"}]}"#;
        let response: RefreshUrlsResponse = serde_json::from_str(json).unwrap();

        let pairs: Vec<RefreshedUrl> = response.refreshed_urls.into_iter().map(Into::into).collect();
        assert_eq!(pairs[0].refreshed, "");
        assert_eq!(pairs[1].refreshed, "c");
    }

    #[test]
    fn test_refresh_response_without_list_is_rejected() {
        assert!(serde_json::from_str::<RefreshUrlsResponse>(r#"{"message": "ok"}"#).is_err());
    }

    #[test]
    fn test_refresh_request_body() {
        let urls = vec!["https://cdn.discordapp.com/attachments/1/2/a.zip".to_string()];
        let body = serde_json::to_value(RefreshUrlsRequest {
            attachment_urls: &urls,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"attachment_urls": ["https://cdn.discordapp.com/attachments/1/2/a.zip"]})
        );
    }
}
