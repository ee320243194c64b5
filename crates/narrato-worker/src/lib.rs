//! Narration video job pipeline.
//!
//! This crate provides:
//! - The fire-and-forget job pipeline (synthesize, compose, upload, notify)
//! - The completion callback to the upstream publishing API
//! - Per-job temp file handling, structured logging and metrics

pub mod artifacts;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod notifier;
pub mod pipeline;

pub use artifacts::JobArtifacts;
pub use config::{NotifierConfig, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use notifier::{CompletionNotifier, HttpNotifier};
pub use pipeline::{JobPipeline, Stage};
