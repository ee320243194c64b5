//! HTTP request/response schemas for job submission.

use serde::{Deserialize, Serialize};
use url::Url;
use validator::{Validate, ValidationError};

use crate::job::{ArticleId, Job};

/// Header carrying the shared secret between this worker and the upstream API.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Maximum accepted thumbnail URL length.
pub const MAX_THUMBNAIL_URL_LENGTH: usize = 2048;

/// Body of `POST /api/v1/generate-video`.
///
/// The Spanish field names used by the publishing API (`texto`,
/// `miniaturaUrl`) are accepted as aliases.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    #[serde(alias = "texto", default)]
    #[validate(custom(function = "validate_text"))]
    pub text: String,

    #[serde(default)]
    #[validate(custom(function = "validate_article_id"))]
    pub article_id: String,

    #[serde(alias = "miniaturaUrl", default)]
    #[validate(custom(function = "validate_thumbnail_url"))]
    pub thumbnail_url: Option<String>,
}

impl GenerateVideoRequest {
    /// Convert a validated request into a job.
    pub fn into_job(self) -> Job {
        Job::new(ArticleId::from(self.article_id), self.text, self.thumbnail_url)
    }
}

fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("empty_text").with_message("text must not be empty".into()));
    }
    Ok(())
}

fn validate_article_id(id: &str) -> Result<(), ValidationError> {
    if !ArticleId::is_valid(id) {
        return Err(ValidationError::new("invalid_article_id").with_message(
            "articleId must be 1-128 characters of letters, digits, '_' or '-'".into(),
        ));
    }
    Ok(())
}

fn validate_thumbnail_url(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Ok(());
    }
    if url.len() > MAX_THUMBNAIL_URL_LENGTH {
        return Err(ValidationError::new("thumbnail_too_long"));
    }
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        _ => Err(ValidationError::new("invalid_thumbnail_url")
            .with_message("thumbnailUrl must be an http(s) URL".into())),
    }
}

/// Immediate acknowledgement returned before any pipeline work starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedResponse {
    pub message: String,
    pub article_id: String,
}

impl AcceptedResponse {
    pub fn new(article_id: &ArticleId) -> Self {
        Self {
            message: "Video processing started".to_string(),
            article_id: article_id.to_string(),
        }
    }
}
