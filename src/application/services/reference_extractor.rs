//! Discovery of attachment references in message text and uploads.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::Url;
use tracing::trace;

use super::cdn_link::{is_cdn_attachment_url, split_attachment_url};
use crate::domain::entities::{Attachment, ContentType, Message};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*",
    )
    .unwrap()
});

/// Query parameter YouTube appends to share links for tracking.
const YOUTUBE_TRACKING_PARAM: &str = "si";

/// Builds attachment records from free text and native uploads.
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    /// Scans `text` for hosted-content links and appends new records.
    ///
    /// Records whose id is already present in `attachments` are skipped.
    pub fn extract_from_text(text: &str, attachments: &mut Vec<Attachment>, suffix: &str) {
        if !text.contains("http") {
            return;
        }

        for found in URL_RE.find_iter(text) {
            let Some(attachment) = Self::classify(found.as_str(), suffix) else {
                continue;
            };

            if attachments.iter().any(|a| a.id() == attachment.id()) {
                trace!(id = attachment.id(), "Skipping duplicate link");
                continue;
            }
            attachments.push(attachment);
        }
    }

    /// Collects records from a message's text and its native uploads.
    ///
    /// A native upload replaces any text-derived record with the same id.
    pub fn extract_from_message(message: &Message, attachments: &mut Vec<Attachment>) {
        let attribution = message.attribution();

        if !message.content().is_empty() {
            Self::extract_from_text(message.content(), attachments, &format!(" {attribution}"));
        }

        for native in message.attachments() {
            let mut record = Attachment::new(
                native.id(),
                native.filename(),
                ContentType::Discord,
                native.url(),
            )
            .with_description(attribution.clone())
            .with_can_download(true);
            if let Some(mime) = native.content_type() {
                record = record.with_mime_type(mime);
            }

            match attachments.iter().position(|a| a.id() == native.id()) {
                Some(index) => {
                    trace!(id = native.id(), "Native upload replaces linked copy");
                    attachments[index] = record;
                }
                None => attachments.push(record),
            }
        }
    }

    /// Turns one matched URL into a record, if it points at a known host.
    fn classify(url: &str, suffix: &str) -> Option<Attachment> {
        if url.starts_with("https://www.mediafire.com/file/")
            || url.starts_with("https://www.mediafire.com/folder/")
        {
            return Self::mediafire(url, suffix);
        }
        if url.starts_with("https://youtu.be/") || url.starts_with("https://www.youtube.com/watch")
        {
            return Self::youtube(url, suffix);
        }
        if is_cdn_attachment_url(url) {
            let (id, name) = split_attachment_url(url)?;
            let name = percent_decode_str(name).decode_utf8_lossy();
            return Some(
                Attachment::new(id, name, ContentType::Discord, url)
                    .with_description(format!("[{}]{suffix}", ContentType::Discord))
                    .with_can_download(true),
            );
        }
        if url.starts_with("https://bilibili.com/") || url.starts_with("https://www.bilibili.com/")
        {
            return Self::bilibili(url, suffix);
        }
        None
    }

    /// `https://www.mediafire.com/file/{id}/{name}/file`
    fn mediafire(url: &str, suffix: &str) -> Option<Attachment> {
        let mut segments = url.split('/').skip(4);
        let id = segments.next().filter(|s| !s.is_empty())?;
        let name = segments
            .next()
            .filter(|s| !s.is_empty())
            .map_or_else(|| id.to_string(), |s| percent_decode_str(s).decode_utf8_lossy().into_owned());

        Some(
            Attachment::new(id, name, ContentType::Mediafire, url)
                .with_description(format!("[{}]{suffix}", ContentType::Mediafire)),
        )
    }

    fn youtube(url: &str, suffix: &str) -> Option<Attachment> {
        let mut parsed = Url::parse(url).ok()?;

        let video_id = parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                parsed
                    .path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .filter(|id| !id.is_empty())?;

        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| key != YOUTUBE_TRACKING_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(kept);
        }

        Some(
            Attachment::new(
                video_id.clone(),
                format!("YouTube Video {video_id}"),
                ContentType::Youtube,
                parsed.to_string(),
            )
            .with_description(format!("[{}]{suffix}", ContentType::Youtube)),
        )
    }

    /// `https://www.bilibili.com/video/{bvid}` or `?bvid=`.
    fn bilibili(url: &str, suffix: &str) -> Option<Attachment> {
        let parsed = Url::parse(url).ok()?;

        let video_id = parsed
            .path_segments()
            .and_then(|mut segments| segments.nth(1).map(str::to_string))
            .filter(|id| !id.is_empty())
            .or_else(|| {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "bvid")
                    .map(|(_, value)| value.into_owned())
            })
            .filter(|id| !id.is_empty())?;

        Some(
            Attachment::new(
                video_id.clone(),
                format!("Bilibili Video {video_id}"),
                ContentType::Bilibili,
                url,
            )
            .with_description(format!("[{}]{suffix}", ContentType::Bilibili)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{MessageAttachment, MessageAuthor};
    use chrono::{TimeZone, Utc};

    fn extract(text: &str) -> Vec<Attachment> {
        let mut attachments = Vec::new();
        ReferenceExtractor::extract_from_text(text, &mut attachments, "");
        attachments
    }

    #[test]
    fn test_mediafire_file_link() {
        let found = extract("check this https://www.mediafire.com/file/abc123/build.zip/file");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "abc123");
        assert_eq!(found[0].name(), "build.zip");
        assert_eq!(found[0].content_type(), ContentType::Mediafire);
        assert!(!found[0].can_download());
        assert_eq!(found[0].description(), "[MediaFire]");
    }

    #[test]
    fn test_mediafire_folder_link_decodes_name() {
        let found = extract("https://www.mediafire.com/folder/5ajiire4a6cs5/Scorpio%20MIS");
        assert_eq!(found[0].id(), "5ajiire4a6cs5");
        assert_eq!(found[0].name(), "Scorpio MIS");
    }

    #[test]
    fn test_youtube_strips_tracking() {
        let found = extract("demo: https://youtu.be/dQw4w9WgXcQ?si=trackme123 enjoy");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "dQw4w9WgXcQ");
        assert_eq!(found[0].url(), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(found[0].content_type(), ContentType::Youtube);
        assert!(!found[0].can_download());
    }

    #[test]
    fn test_youtube_watch_keeps_other_params() {
        let found = extract("https://www.youtube.com/watch?v=abcDEF&t=42&si=x");

        assert_eq!(found[0].id(), "abcDEF");
        assert_eq!(found[0].url(), "https://www.youtube.com/watch?v=abcDEF&t=42");
    }

    #[test]
    fn test_cdn_link_is_downloadable() {
        let found = extract(
            "https://cdn.discordapp.com/attachments/749137321710059542/912059917106548746/Unbreakable_box.litematic?ex=6832c4bd&is=6831733d&hm=1e5f&",
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "912059917106548746");
        assert_eq!(found[0].name(), "Unbreakable_box.litematic");
        assert!(found[0].can_download());
        assert_eq!(found[0].description(), "[DiscordCDN]");
    }

    #[test]
    fn test_bilibili_link() {
        let found = extract("https://www.bilibili.com/video/BV1GJ411x7h7/");
        assert_eq!(found[0].id(), "BV1GJ411x7h7");
        assert_eq!(found[0].content_type(), ContentType::Bilibili);
    }

    #[test]
    fn test_unknown_hosts_ignored() {
        assert!(extract("see https://example.com/build.zip and http://foo.bar").is_empty());
        assert!(extract("no links here").is_empty());
    }

    #[test]
    fn test_duplicate_links_collapse() {
        let found = extract(
            "https://www.mediafire.com/file/abc123/a.zip/file https://www.mediafire.com/file/abc123/a.zip/file",
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_existing_records_are_not_duplicated() {
        let mut attachments = vec![Attachment::new("abc123", "a.zip", ContentType::Mediafire, "x")];
        ReferenceExtractor::extract_from_text(
            "https://www.mediafire.com/file/abc123/a.zip/file",
            &mut attachments,
            "",
        );
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].url(), "x");
    }

    #[test]
    fn test_native_upload_wins_over_link() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let message = Message::new(
            10u64,
            20u64,
            MessageAuthor::new("30", "alice", false),
            "reposting https://cdn.discordapp.com/attachments/1/555/farm.litematic?ex=1",
            timestamp,
        )
        .with_attachments(vec![
            MessageAttachment::new(
                "555",
                "farm.litematic",
                1024,
                "https://cdn.discordapp.com/attachments/20/555/farm.litematic",
            )
            .with_content_type("application/octet-stream"),
        ]);

        let mut attachments = Vec::new();
        ReferenceExtractor::extract_from_message(&message, &mut attachments);

        assert_eq!(attachments.len(), 1);
        let record = &attachments[0];
        assert_eq!(record.id(), "555");
        assert_eq!(record.url(), "https://cdn.discordapp.com/attachments/20/555/farm.litematic");
        assert_eq!(record.description(), "Sent by alice at 2025-01-02 03:04:05 UTC");
        assert_eq!(record.mime_type(), Some("application/octet-stream"));
        assert!(record.can_download());
    }

    #[test]
    fn test_text_records_carry_attribution() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let message = Message::new(
            1u64,
            2u64,
            MessageAuthor::new("3", "bob", false),
            "https://www.mediafire.com/file/xyz/world.zip/file",
            timestamp,
        );

        let mut attachments = Vec::new();
        ReferenceExtractor::extract_from_message(&message, &mut attachments);

        assert_eq!(
            attachments[0].description(),
            "[MediaFire] Sent by bob at 2025-01-02 03:04:05 UTC"
        );
    }
}
