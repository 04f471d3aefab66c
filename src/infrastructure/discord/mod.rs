//! Discord REST API client.

mod client;
mod dto;

pub use client::{DEFAULT_TIMEOUT_SECS, DISCORD_API_BASE, DiscordRestClient};
