//! Application configuration.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::args::CliArgs;
use crate::application::DEFAULT_SYSTEM_AUTHOR_ID;
use crate::domain::services::LayoutMode;
use crate::infrastructure::discord::{DEFAULT_TIMEOUT_SECS, DISCORD_API_BASE};
use crate::infrastructure::video::NOEMBED_ENDPOINT;

const APP_NAME: &str = "submission-ingest";
const APP_QUALIFIER: &str = "org";
const APP_ORGANIZATION: &str = "submission-archive";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loading failures.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from TOML and merged with CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go nowhere when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Discord API settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Local directories.
    #[serde(default)]
    pub media: MediaConfig,

    /// Analyzer settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Discord API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// REST base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bot account whose messages are scanned like user messages.
    #[serde(default = "default_system_author_id")]
    pub system_author_id: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            system_author_id: default_system_author_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Local directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Staging directory for raw image downloads.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Output directory for normalized images.
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,

    /// Directory for materialized attachments.
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: PathBuf,

    /// Gallery layout used when rendering.
    #[serde(default)]
    pub gallery_mode: LayoutMode,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            processed_dir: default_processed_dir(),
            attachments_dir: default_attachments_dir(),
            gallery_mode: LayoutMode::default(),
        }
    }
}

/// Analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// JSON file extending the builtin data-version table.
    #[serde(default)]
    pub version_table: Option<PathBuf>,

    /// oEmbed proxy used for video links.
    #[serde(default = "default_noembed_endpoint")]
    pub noembed_endpoint: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            version_table: None,
            noembed_endpoint: default_noembed_endpoint(),
        }
    }
}

fn default_api_base() -> String {
    DISCORD_API_BASE.to_string()
}

fn default_system_author_id() -> String {
    DEFAULT_SYSTEM_AUTHOR_ID.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("processed")
}

fn default_attachments_dir() -> PathBuf {
    PathBuf::from("attachments")
}

fn default_noembed_endpoint() -> String {
    NOEMBED_ENDPOINT.to_string()
}

impl AppConfig {
    /// Loads the configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults. A malformed file is reported and
    /// also yields the defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_config_path) else {
            return Ok(Self::default());
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let mut config = match toml::from_str::<Self>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                Self::default()
            }
        };
        config.config = Some(path);
        Ok(config)
    }

    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(dir) = &args.attachments_dir {
            self.media.attachments_dir.clone_from(dir);
        }
        if let Some(dir) = &args.processed_dir {
            self.media.processed_dir.clone_from(dir);
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }
}
