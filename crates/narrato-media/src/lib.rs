//! External media tooling for narration videos.
//!
//! This crate provides:
//! - A process runner that streams child output into the log
//! - Type-safe FFmpeg command building
//! - Speech synthesis through the Coqui TTS script
//! - Presenter clip selection and audio/video muxing

pub mod avatar;
pub mod command;
pub mod compose;
pub mod error;
pub mod tts;

pub use avatar::AvatarSelector;
pub use command::{check_program, FfmpegCommand, ProcessRunner};
pub use compose::{ComposerConfig, FfmpegComposer, VideoComposer};
pub use error::{MediaError, MediaResult};
pub use tts::{sanitize_for_argument, CoquiSynthesizer, SpeechSynthesizer, TtsConfig};
