//! Completion callback to the upstream publishing API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use narrato_models::{ArticleId, PipelineOutcome, VideoCompletePayload, API_KEY_HEADER};

use crate::config::NotifierConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics;

/// Path of the completion endpoint on the upstream API.
pub const VIDEO_COMPLETE_PATH: &str = "/api/article/video-complete";

/// Reports a job's outcome upstream.
///
/// Implementations never fail: delivery problems are logged and swallowed,
/// since the job is already finished by the time it is reported.
#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    async fn notify(&self, article_id: &ArticleId, outcome: &PipelineOutcome);
}

/// Notifier posting `VideoCompletePayload` over HTTP.
#[derive(Clone)]
pub struct HttpNotifier {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl HttpNotifier {
    pub fn new(config: NotifierConfig) -> WorkerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WorkerError::config_error(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), VIDEO_COMPLETE_PATH),
            api_key: config.api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver the payload, surfacing transport and status errors.
    pub async fn try_notify(
        &self,
        article_id: &ArticleId,
        outcome: &PipelineOutcome,
    ) -> WorkerResult<()> {
        let payload = VideoCompletePayload::new(article_id, outcome);

        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WorkerError::notification_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::notification_failed(format!(
                "upstream returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CompletionNotifier for HttpNotifier {
    async fn notify(&self, article_id: &ArticleId, outcome: &PipelineOutcome) {
        match self.try_notify(article_id, outcome).await {
            Ok(()) => info!(
                article_id = %article_id,
                outcome = outcome.as_str(),
                "[API-Notify] Notification delivered"
            ),
            Err(e) => {
                metrics::record_notification_failed();
                error!(
                    article_id = %article_id,
                    outcome = outcome.as_str(),
                    "[API-Notify] CRITICAL: upstream was not told about this job: {}", e
                );
            }
        }
    }
}
