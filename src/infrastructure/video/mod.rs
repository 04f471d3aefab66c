//! Linked-video metadata lookups.

mod noembed;

pub use noembed::{NOEMBED_ENDPOINT, NoEmbedClient};
