//! Infrastructure layer with external service adapters.

/// Format analyzers and the data-version table.
pub mod analyzers;
/// Bounded zip archive reading.
pub mod archive;
/// Application configuration.
pub mod config;
/// Discord REST client.
pub mod discord;
/// Downloads, file store and image processing.
pub mod media;
/// Named Binary Tag decoding.
pub mod nbt;
/// Video metadata lookups.
pub mod video;

pub use analyzers::{AttachmentAnalyzer, VersionTable};
pub use config::{AppConfig, CliArgs, Command, LogLevel};
pub use discord::DiscordRestClient;
pub use media::{AttachmentDownloader, FileStore, ImageNormalizer};
pub use video::NoEmbedClient;
