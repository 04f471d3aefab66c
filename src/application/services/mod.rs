//! Application services.

pub mod cdn_link;
pub mod reference_extractor;
pub mod url_refresher;

pub use cdn_link::{is_cdn_attachment_url, needs_refresh, split_attachment_url};
pub use reference_extractor::ReferenceExtractor;
pub use url_refresher::UrlRefresher;
