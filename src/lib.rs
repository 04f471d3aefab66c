//! Submission ingest - attachment pipeline for an archive of community builds.
//!
//! Discovers file references in channel history, materializes them in a
//! cache-aware local store, inspects schematics, world saves and video links,
//! and prepares images for fixed-layout galleries.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing text services and use cases.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "submission-ingest";
