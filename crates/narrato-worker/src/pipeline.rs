//! The narration job pipeline.
//!
//! A job runs synthesis, composition and upload strictly in sequence and
//! stops at the first failure. Whatever happens, the outcome is reported
//! exactly once and the job's temp files are removed afterwards.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, Instrument};

use narrato_media::{SpeechSynthesizer, VideoComposer};
use narrato_models::{Job, PipelineOutcome};
use narrato_storage::{AssetUploader, UploadedAsset};

use crate::artifacts::JobArtifacts;
use crate::error::WorkerError;
use crate::logging::JobLogger;
use crate::metrics;
use crate::notifier::CompletionNotifier;

const OPERATION: &str = "generate_video";

/// Pipeline stage, used in logs and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Synthesis,
    Composition,
    Upload,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Synthesis => "synthesis",
            Stage::Composition => "composition",
            Stage::Upload => "upload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct StageFailure {
    stage: Stage,
    error: WorkerError,
}

/// Runs narration jobs against a fixed set of collaborators.
pub struct JobPipeline {
    temp_dir: PathBuf,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    composer: Arc<dyn VideoComposer>,
    uploader: Arc<dyn AssetUploader>,
    notifier: Arc<dyn CompletionNotifier>,
    tasks: TaskTracker,
}

impl JobPipeline {
    pub fn new(
        temp_dir: impl Into<PathBuf>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        composer: Arc<dyn VideoComposer>,
        uploader: Arc<dyn AssetUploader>,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            synthesizer,
            composer,
            uploader,
            notifier,
            tasks: TaskTracker::new(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Run the job in a background task and return immediately.
    pub fn spawn(self: &Arc<Self>, job: Job) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        let span = JobLogger::new(&job.article_id, OPERATION).create_span();

        self.tasks.spawn(
            async move {
                pipeline.run(job).await;
            }
            .instrument(span),
        )
    }

    /// Number of spawned jobs that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every spawned job to report and clean up.
    ///
    /// Jobs spawned after this call are still tracked and awaited.
    pub async fn shutdown(&self) {
        self.tasks.close();
        if !self.tasks.is_empty() {
            info!("Waiting for {} in-flight job(s)", self.tasks.len());
        }
        self.tasks.wait().await;
    }

    /// Run the job to completion and return the outcome that was reported.
    pub async fn run(&self, job: Job) -> PipelineOutcome {
        let logger = JobLogger::new(&job.article_id, OPERATION);
        logger.log_start(&format!("{} characters of text", job.text.chars().count()));

        let mut artifacts = JobArtifacts::new(&self.temp_dir, &job.article_id);

        let produced = AssertUnwindSafe(self.produce(&job, &artifacts, &logger))
            .catch_unwind()
            .await;

        let outcome = match produced {
            Ok(Ok(asset)) => {
                metrics::record_job_completed();
                logger.log_completion(&format!("published {}", asset.url));
                PipelineOutcome::success(asset.url, job.thumbnail_url.clone())
            }
            Ok(Err(failure)) => {
                metrics::record_job_failed(failure.stage.as_str());
                logger.log_error(&format!("{} failed: {}", failure.stage, failure.error));
                PipelineOutcome::failure(failure.error.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                metrics::record_job_failed("panic");
                logger.log_error(&format!("stage panicked: {}", message));
                PipelineOutcome::failure(format!("unexpected fault: {}", message))
            }
        };

        self.notifier.notify(&job.article_id, &outcome).await;

        let removed = artifacts.cleanup().await;
        debug!(article_id = %job.article_id, "Removed {} temp file(s)", removed);

        outcome
    }

    async fn produce(
        &self,
        job: &Job,
        artifacts: &JobArtifacts,
        logger: &JobLogger,
    ) -> Result<UploadedAsset, StageFailure> {
        let audio = timed(
            Stage::Synthesis,
            logger,
            self.synthesizer.synthesize(&job.text, artifacts.audio_path()),
        )
        .await?;

        let video = timed(
            Stage::Composition,
            logger,
            self.composer.compose(&audio, artifacts.video_path()),
        )
        .await?;

        timed(
            Stage::Upload,
            logger,
            self.uploader.upload(
                &video,
                job.article_id.as_str(),
                job.thumbnail_url.as_deref(),
            ),
        )
        .await
    }
}

async fn timed<T, E>(
    stage: Stage,
    logger: &JobLogger,
    work: impl Future<Output = Result<T, E>>,
) -> Result<T, StageFailure>
where
    E: Into<WorkerError>,
{
    logger.log_stage(stage.as_str(), &format!("Starting {}", stage));
    let started = Instant::now();
    let result = work.await;
    metrics::record_stage_duration(stage.as_str(), started.elapsed());

    result.map_err(|e| StageFailure {
        stage,
        error: e.into(),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
