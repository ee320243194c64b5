//! Speech synthesis through an external TTS process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::command::{exit_code, ProcessRunner};
use crate::error::{MediaError, MediaResult};

/// Turns narration text into an audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into `output`, returning the written path.
    async fn synthesize(&self, text: &str, output: &Path) -> MediaResult<PathBuf>;
}

/// Configuration for the external TTS program.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Executable to spawn
    pub program: String,
    /// Arguments placed before the text and output path
    pub args: Vec<String>,
    /// Kill the process after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["tts_script.py".to_string()],
            timeout_secs: None,
        }
    }
}

/// Coqui TTS invoked as `<program> [args...] <text> <output>`.
#[derive(Debug, Clone)]
pub struct CoquiSynthesizer {
    config: TtsConfig,
    runner: ProcessRunner,
}

impl CoquiSynthesizer {
    pub fn new(config: TtsConfig) -> Self {
        let runner = ProcessRunner::new("CoquiTTS").with_timeout(config.timeout_secs);
        Self { config, runner }
    }

    /// Full argument list for one invocation.
    pub fn build_args(&self, text: &str, output: &Path) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.push(sanitize_for_argument(text));
        args.push(output.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl SpeechSynthesizer for CoquiSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> MediaResult<PathBuf> {
        info!("[CoquiTTS] Synthesizing {} chars into {}", text.len(), output.display());

        let status = self
            .runner
            .run(&self.config.program, &self.build_args(text, output))
            .await?;

        if !status.success() {
            return Err(MediaError::SynthesisFailed {
                exit_code: exit_code(&status),
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(MediaError::MissingOutput(output.to_path_buf()));
        }

        Ok(output.to_path_buf())
    }
}

/// Make text safe to pass as a single process argument.
///
/// Double quotes become single quotes and every line break (`\r\n`, `\n`,
/// `\r`) becomes one space. Nothing else is changed.
pub fn sanitize_for_argument(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh_synthesizer(script: &str) -> CoquiSynthesizer {
        // $1 is the sanitized text, $2 the output path
        CoquiSynthesizer::new(TtsConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "tts".to_string()],
            timeout_secs: None,
        })
    }

    #[test]
    fn test_sanitize_quotes_and_newlines() {
        assert_eq!(
            sanitize_for_argument("He said \"hi\"\nthen\r\nleft\rquickly"),
            "He said 'hi' then left quickly"
        );
        assert_eq!(sanitize_for_argument("plain text"), "plain text");
        assert_eq!(sanitize_for_argument("a\n\nb"), "a  b");
    }

    #[test]
    fn test_build_args_order() {
        let synth = CoquiSynthesizer::new(TtsConfig::default());
        let args = synth.build_args("Hola \"mundo\"", Path::new("/tmp/A1_audio.wav"));
        assert_eq!(args, vec!["tts_script.py", "Hola 'mundo'", "/tmp/A1_audio.wav"]);
    }

    #[tokio::test]
    async fn test_synthesize_success() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("A1_audio.wav");

        let synth = sh_synthesizer("printf '%s' \"$1\" > \"$2\"");
        let path = synth.synthesize("Hello\nworld", &output).await.unwrap();

        assert_eq!(path, output);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello world");
    }

    #[tokio::test]
    async fn test_synthesize_nonzero_exit() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("A1_audio.wav");

        let err = sh_synthesizer("echo boom >&2; exit 1")
            .synthesize("Hello", &output)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::SynthesisFailed { exit_code: 1 }));
        assert_eq!(err.to_string(), "CoquiTTS falló (código 1)");
    }

    #[tokio::test]
    async fn test_synthesize_missing_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("A1_audio.wav");

        let err = sh_synthesizer("exit 0")
            .synthesize("Hello", &output)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::MissingOutput(_)));
    }
}
