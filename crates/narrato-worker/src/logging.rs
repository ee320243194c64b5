//! Structured job logging.
//!
//! Every line emitted for a job carries the article id and the operation,
//! so a single narration can be followed through the log.

use tracing::{error, info, Span};

use narrato_models::ArticleId;

/// Logger bound to one job.
#[derive(Debug, Clone)]
pub struct JobLogger {
    article_id: String,
    operation: String,
}

impl JobLogger {
    pub fn new(article_id: &ArticleId, operation: &str) -> Self {
        Self {
            article_id: article_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            article_id = %self.article_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    /// Log entry into a pipeline stage.
    pub fn log_stage(&self, stage: &str, message: &str) {
        info!(
            article_id = %self.article_id,
            operation = %self.operation,
            stage = stage,
            "{}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            article_id = %self.article_id,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            article_id = %self.article_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span to instrument the job's background task with.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            article_id = %self.article_id,
            operation = %self.operation
        )
    }
}
