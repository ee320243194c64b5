//! Terminal job outcome and the completion callback body.

use serde::{Deserialize, Serialize};

use crate::job::ArticleId;

/// The single result decided for a job, reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The video was published.
    Success {
        asset_url: String,
        thumbnail_url: Option<String>,
    },
    /// A stage failed; later stages did not run.
    Failure { message: String },
}

impl PipelineOutcome {
    pub fn success(asset_url: impl Into<String>, thumbnail_url: Option<String>) -> Self {
        Self::Success {
            asset_url: asset_url.into(),
            thumbnail_url,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineOutcome::Success { .. } => "success",
            PipelineOutcome::Failure { .. } => "failure",
        }
    }
}

/// Body of `POST <upstream>/api/article/video-complete`.
///
/// All keys are always present; fields that do not apply are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCompletePayload {
    pub article_id: String,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub error: Option<String>,
}

impl VideoCompletePayload {
    pub fn new(article_id: &ArticleId, outcome: &PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Success {
                asset_url,
                thumbnail_url,
            } => Self {
                article_id: article_id.to_string(),
                video_url: Some(asset_url.clone()),
                thumbnail_url: thumbnail_url.clone(),
                error: None,
            },
            PipelineOutcome::Failure { message } => Self {
                article_id: article_id.to_string(),
                video_url: None,
                thumbnail_url: None,
                error: Some(message.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_payload() {
        let outcome = PipelineOutcome::success(
            "https://cdn/x/A1.mp4",
            Some("http://x/thumb.jpg".to_string()),
        );
        let payload = VideoCompletePayload::new(&ArticleId::from("A1"), &outcome);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "articleId": "A1",
                "videoUrl": "https://cdn/x/A1.mp4",
                "thumbnailUrl": "http://x/thumb.jpg",
                "error": null
            })
        );
    }

    #[test]
    fn test_success_without_thumbnail_keeps_null_key() {
        let outcome = PipelineOutcome::success("https://cdn/x/A1.mp4", None);
        let value =
            serde_json::to_value(VideoCompletePayload::new(&ArticleId::from("A1"), &outcome))
                .unwrap();

        assert!(value.get("thumbnailUrl").unwrap().is_null());
        assert!(value.get("error").unwrap().is_null());
    }

    #[test]
    fn test_failure_payload() {
        let outcome = PipelineOutcome::failure("CoquiTTS falló (código 1)");
        let payload = VideoCompletePayload::new(&ArticleId::from("A1"), &outcome);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "articleId": "A1",
                "videoUrl": null,
                "thumbnailUrl": null,
                "error": "CoquiTTS falló (código 1)"
            })
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.as_str(), "failure");
    }
}
