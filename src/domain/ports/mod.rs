//! Port definitions for the pipeline's external collaborators.

mod byte_fetch_port;
mod message_history_port;
mod url_refresh_port;
mod video_metadata_port;

pub use byte_fetch_port::ByteFetchPort;
pub use message_history_port::{FetchMessagesOptions, MAX_PAGE_SIZE, MessageHistoryPort};
pub use url_refresh_port::{RefreshedUrl, UrlRefreshPort};
pub use video_metadata_port::VideoMetadataPort;
