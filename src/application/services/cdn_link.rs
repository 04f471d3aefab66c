//! Discord CDN attachment link inspection.

use chrono::{DateTime, Utc};
use reqwest::Url;

/// Prefix shared by every signed attachment link.
pub const CDN_ATTACHMENT_PREFIX: &str = "https://cdn.discordapp.com/attachments/";

/// Checks if a URL is a Discord CDN attachment link.
#[must_use]
pub fn is_cdn_attachment_url(url: &str) -> bool {
    url.starts_with(CDN_ATTACHMENT_PREFIX)
}

/// Splits a CDN attachment link into `(attachment_id, filename)`.
///
/// Links look like
/// `https://cdn.discordapp.com/attachments/{channel_id}/{attachment_id}/{filename}?ex=..`.
#[must_use]
pub fn split_attachment_url(url: &str) -> Option<(&str, &str)> {
    let path = url.strip_prefix(CDN_ATTACHMENT_PREFIX)?;
    let path = path.split(['?', '#']).next()?;

    let mut parts = path.split('/');
    let _channel_id = parts.next()?;
    let attachment_id = parts.next().filter(|s| !s.is_empty())?;
    let filename = parts.next().filter(|s| !s.is_empty())?;

    Some((attachment_id, filename))
}

/// Signature parameters carried by a CDN link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CdnSignature {
    /// Expiry as Unix seconds, from the hex `ex` parameter.
    pub expires_at: Option<i64>,
    /// Whether the `is` issue timestamp is present.
    pub has_issued: bool,
    /// Whether the `hm` HMAC is present.
    pub has_hmac: bool,
}

impl CdnSignature {
    /// Reads the signature parameters from `url`.
    #[must_use]
    pub fn parse(url: &Url) -> Self {
        let mut signature = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "ex" => signature.expires_at = i64::from_str_radix(&value, 16).ok(),
                "is" => signature.has_issued = !value.is_empty(),
                "hm" => signature.has_hmac = !value.is_empty(),
                _ => {}
            }
        }
        signature
    }
}

/// Decides whether `url` must be renewed before it can be downloaded.
///
/// Links outside the CDN never need renewal. CDN links need it when the expiry
/// is missing or past, or when either integrity parameter is absent (links
/// signed under the older scheme).
#[must_use]
pub fn needs_refresh(url: &str, now: DateTime<Utc>) -> bool {
    if !is_cdn_attachment_url(url) {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return true;
    };
    let signature = CdnSignature::parse(&parsed);

    match signature.expires_at {
        Some(expires_at) if expires_at.saturating_mul(1000) > now.timestamp_millis() => {
            !(signature.has_issued && signature.has_hmac)
        }
        _ => true,
    }
}
