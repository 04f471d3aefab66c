use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::app_config::LogLevel;

#[derive(Debug, Parser)]
#[command(
    name = "submission-ingest",
    version,
    about = "Collects, downloads and inspects archived submission attachments",
    long_about = None
)]
#[allow(missing_docs)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Bot token used for Discord requests.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Directory for downloaded attachments.
    #[arg(long, value_name = "DIR", global = true)]
    pub attachments_dir: Option<PathBuf>,

    /// Directory for normalized images.
    #[arg(long, value_name = "DIR", global = true)]
    pub processed_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
#[allow(missing_docs)]
pub enum Command {
    /// Collect every attachment of a channel, download and analyze it.
    Collect {
        /// Channel or thread id.
        #[arg(long)]
        channel: u64,

        /// Keep files in the attachment directory that belong to no record.
        #[arg(long)]
        no_prune: bool,
    },

    /// Analyze local litematic and world archive files.
    Analyze {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Render gallery assets for processed images.
    Gallery {
        #[arg(required = true, value_name = "IMAGE")]
        images: Vec<PathBuf>,

        /// Give every image its own square cell.
        #[arg(long)]
        full: bool,
    },

    /// Print the file key for an attachment.
    Key {
        id: String,
        name: String,

        /// Replace the extension.
        #[arg(long)]
        ext: Option<String>,
    },
}
