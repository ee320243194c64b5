//! Muxing narration audio over a presenter clip.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::avatar::AvatarSelector;
use crate::command::{exit_code, FfmpegCommand, ProcessRunner};
use crate::error::{MediaError, MediaResult};

/// Audio codec the narration is re-encoded to.
pub const AUDIO_CODEC: &str = "aac";

/// Combines a synthesized narration with a presenter video.
#[async_trait]
pub trait VideoComposer: Send + Sync {
    /// Compose `audio` into a final video at `output`, returning the written path.
    async fn compose(&self, audio: &Path, output: &Path) -> MediaResult<PathBuf>;
}

/// Configuration for the encoder process.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Executable to spawn
    pub program: String,
    /// Arguments placed before the generated ffmpeg arguments
    pub leading_args: Vec<String>,
    /// Kill the process after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            leading_args: vec!["-hide_banner".to_string()],
            timeout_secs: None,
        }
    }
}

/// Composer backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegComposer {
    avatars: AvatarSelector,
    config: ComposerConfig,
    runner: ProcessRunner,
}

impl FfmpegComposer {
    pub fn new(avatars: AvatarSelector, config: ComposerConfig) -> Self {
        let runner = ProcessRunner::new("FFmpeg").with_timeout(config.timeout_secs);
        Self {
            avatars,
            config,
            runner,
        }
    }

    /// Video stream copied from the avatar, audio re-encoded, cut to the shorter input.
    pub fn build_command(avatar: &Path, audio: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(output)
            .input(avatar)
            .input(audio)
            .map("0:v:0")
            .map("1:a:0")
            .video_codec("copy")
            .audio_codec(AUDIO_CODEC)
            .shortest()
    }
}

#[async_trait]
impl VideoComposer for FfmpegComposer {
    async fn compose(&self, audio: &Path, output: &Path) -> MediaResult<PathBuf> {
        let avatar = self.avatars.pick().await?;
        info!(
            "[FFmpeg] Using avatar: {}",
            avatar.file_name().unwrap_or_default().to_string_lossy()
        );

        let mut args = self.config.leading_args.clone();
        args.extend(Self::build_command(&avatar, audio, output).build_args());
        let status = self.runner.run(&self.config.program, &args).await?;

        if !status.success() {
            return Err(MediaError::FfmpegFailed {
                exit_code: exit_code(&status),
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(MediaError::MissingOutput(output.to_path_buf()));
        }

        Ok(output.to_path_buf())
    }
}
