//! Format-specific analysis of submission files.

mod attachment_analyzer;
mod error;
mod litematic;
mod version_table;
mod world_save;

pub use attachment_analyzer::AttachmentAnalyzer;
pub use error::{AnalysisError, AnalysisResult};
pub use litematic::{LITEMATIC_ERROR, describe_litematic, read_litematic};
pub use version_table::{UNKNOWN_VERSION, VersionTable};
pub use world_save::{LEVEL_DESCRIPTOR, describe_level, read_world_save};
