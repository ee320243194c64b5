//! Shared data models for the Narrato worker.
//!
//! This crate provides Serde-serializable types for:
//! - Narration jobs and article identifiers
//! - Job submission requests and acknowledgements
//! - Pipeline outcomes and the completion callback body

pub mod job;
pub mod outcome;
pub mod request;

// Re-export common types
pub use job::{ArticleId, Job, MAX_ARTICLE_ID_LENGTH};
pub use outcome::{PipelineOutcome, VideoCompletePayload};
pub use request::{AcceptedResponse, GenerateVideoRequest, API_KEY_HEADER};
