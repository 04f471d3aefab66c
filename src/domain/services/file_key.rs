//! Stable on-disk naming for attachments and images.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes escaped in the name part. Dots are escaped so the only literal dot
/// in a key is the extension separator.
const PREFIX_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Bytes escaped in the id and the extension. The id keeps no literal `-`,
/// so the first dash of a key always ends the id.
const STRICT_SET: &AsciiSet = NON_ALPHANUMERIC;

/// Derives the filesystem-safe key for a record.
///
/// The key is `"{id}-{name}"` lowercased, with the trailing extension of the
/// name split off (or replaced by `forced_extension`) and every part
/// percent-escaped. The result never contains path separators, NUL or
/// characters reserved on common filesystems, and is always lowercase.
#[must_use]
pub fn file_key(id: &str, name: &str, forced_extension: Option<&str>) -> String {
    let id = id.to_lowercase();
    let name = name.to_lowercase();

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, ext.to_string()),
        _ => (name.as_str(), String::new()),
    };
    let extension = forced_extension.map_or(extension, str::to_lowercase);

    let prefix = format!(
        "{}-{}",
        utf8_percent_encode(&id, STRICT_SET),
        utf8_percent_encode(stem, PREFIX_SET)
    );
    let key = if extension.is_empty() {
        prefix
    } else {
        format!("{prefix}.{}", utf8_percent_encode(&extension, STRICT_SET))
    };

    key.to_lowercase()
}
