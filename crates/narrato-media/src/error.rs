//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while synthesizing or composing media.
///
/// The `Display` strings of the stage failures are what the upstream API
/// receives as the job's error message.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("CoquiTTS falló (código {exit_code})")]
    SynthesisFailed { exit_code: i32 },

    #[error("FFmpeg falló (código {exit_code})")]
    FfmpegFailed { exit_code: i32 },

    #[error("no avatars available")]
    NoAvatars,

    #[error("Program not found: {0}")]
    ProgramNotFound(String),

    #[error("Expected output was not produced: {0}")]
    MissingOutput(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
