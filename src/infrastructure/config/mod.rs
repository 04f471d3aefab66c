//! Application configuration.

pub mod app_config;
pub mod args;

pub use app_config::{AnalysisConfig, AppConfig, ConfigError, DiscordConfig, LogLevel, MediaConfig};
pub use args::{CliArgs, Command};
