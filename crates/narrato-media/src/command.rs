//! FFmpeg command builder and external process runner.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// FFmpeg only reports errors; progress chatter would flood the log.
const FFMPEG_LOG_LEVEL: &str = "error";

/// Builder for FFmpeg commands with any number of inputs.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file paths, in `-i` order
    inputs: Vec<PathBuf>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Add an input file.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Select a stream, e.g. `0:v:0`.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Stop at the end of the shortest input.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Set whether an existing output is overwritten.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(FFMPEG_LOG_LEVEL.to_string());

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runs an external program, streaming its output lines into the log.
///
/// The calling task suspends until the process exits; stdout and stderr are
/// read concurrently and logged line by line as they arrive.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Prefix for log lines, e.g. `CoquiTTS`
    label: String,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl ProcessRunner {
    /// Create a new runner.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            timeout_secs: None,
        }
    }

    /// Set timeout. The process is killed when it expires.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run `program` with `args` and return its exit status.
    pub async fn run(&self, program: &str, args: &[String]) -> MediaResult<ExitStatus> {
        debug!("[{}] Running: {} {}", self.label, program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MediaError::ProgramNotFound(program.to_string()),
                _ => MediaError::Io(e),
            })?;

        let stdout_task = child
            .stdout
            .take()
            .map(|out| spawn_line_logger(out, format!("{}-STDOUT", self.label), false));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| spawn_line_logger(err, format!("{}-STDERR", self.label), true));

        let result = self.wait_for_completion(&mut child).await;

        for task in [stdout_task, stderr_task].into_iter().flatten() {
            let _ = task.await;
        }

        result
    }

    /// Wait for child process with optional timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let Some(timeout_secs) = self.timeout_secs else {
            return Ok(child.wait().await?);
        };

        match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!(
                    "[{}] Timed out after {} seconds, killing process",
                    self.label, timeout_secs
                );
                let _ = child.kill().await;
                Err(MediaError::Timeout(timeout_secs))
            }
        }
    }
}

/// Exit code of a finished process; `-1` when it was terminated by a signal.
pub fn exit_code(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn spawn_line_logger<R>(stream: R, tag: String, is_stderr: bool) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        // Lines are read as raw bytes and the pipe is drained to EOF, so a
        // child never sees a closed pipe because of what it printed.
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end();
                    if line.trim().is_empty() {
                        continue;
                    }
                    if is_stderr {
                        warn!("[{}]: {}", tag, line);
                    } else {
                        info!("[{}]: {}", tag, line);
                    }
                }
                Err(e) => {
                    debug!("[{}] Stopped reading output: {}", tag, e);
                    break;
                }
            }
        }
    })
}

/// Check if a program is available on PATH (or as a path).
pub fn check_program(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::ProgramNotFound(program.to_string()))
}
