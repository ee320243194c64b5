//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use narrato_media::{ComposerConfig, TtsConfig};
use narrato_storage::DEFAULT_UPLOAD_FOLDER;

use crate::error::{WorkerError, WorkerResult};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory holding the presenter clips
    pub avatar_dir: PathBuf,
    /// Directory for per-job intermediate files
    pub temp_dir: PathBuf,
    /// Speech synthesis process
    pub tts: TtsConfig,
    /// Encoder process
    pub composer: ComposerConfig,
    /// Storage key prefix for uploaded videos
    pub upload_folder: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            avatar_dir: PathBuf::from("./avatars"),
            temp_dir: PathBuf::from("./temp"),
            tts: TtsConfig::default(),
            composer: ComposerConfig::default(),
            upload_folder: DEFAULT_UPLOAD_FOLDER.to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let stage_timeout = lookup("WORKER_STAGE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0);

        let tts = TtsConfig {
            program: non_empty(lookup("TTS_PROGRAM")).unwrap_or(defaults.tts.program),
            args: lookup("TTS_ARGS")
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.tts.args),
            timeout_secs: stage_timeout,
        };

        let composer = ComposerConfig {
            program: non_empty(lookup("FFMPEG_PROGRAM")).unwrap_or(defaults.composer.program),
            leading_args: defaults.composer.leading_args,
            timeout_secs: stage_timeout,
        };

        Self {
            avatar_dir: non_empty(lookup("AVATAR_DIR"))
                .map(PathBuf::from)
                .unwrap_or(defaults.avatar_dir),
            temp_dir: non_empty(lookup("TEMP_DIR"))
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            tts,
            composer,
            upload_folder: lookup("UPLOAD_FOLDER").unwrap_or(defaults.upload_folder),
        }
    }

    /// Create the avatar and temp directories if they are missing.
    pub async fn ensure_dirs(&self) -> WorkerResult<()> {
        tokio::fs::create_dir_all(&self.avatar_dir).await?;
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        Ok(())
    }
}

/// Completion callback configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Base URL of the upstream publishing API
    pub base_url: String,
    /// Shared secret sent as `x-api-key`
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl NotifierConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WorkerResult<Self> {
        let base_url = non_empty(lookup("MAIN_API_URL"))
            .ok_or_else(|| WorkerError::config_error("MAIN_API_URL not set"))?;
        let api_key = non_empty(lookup("ADMIN_API_KEY"))
            .ok_or_else(|| WorkerError::config_error("ADMIN_API_KEY not set"))?;
        let timeout = lookup("NOTIFY_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self::new(base_url, api_key).with_timeout(Duration::from_secs(timeout)))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
