//! Job definitions for background narration runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of an article identifier.
pub const MAX_ARTICLE_ID_LENGTH: usize = 128;

/// Caller-supplied article identifier.
///
/// Used as the correlation key for logs, as the stem of the job's temporary
/// file names, and as the public id of the uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub String);

impl ArticleId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that the id is safe to embed in file names and storage keys.
    pub fn is_valid(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= MAX_ARTICLE_ID_LENGTH
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A narration job: text in, published video out.
///
/// Jobs are never persisted. One lives for the duration of a single pipeline
/// run and is dropped after the completion notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Article this video belongs to
    pub article_id: ArticleId,

    /// Narration script
    pub text: String,

    /// Poster image to attach to the uploaded video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Job {
    /// Create a new job. An empty thumbnail is treated as absent.
    pub fn new(
        article_id: impl Into<ArticleId>,
        text: impl Into<String>,
        thumbnail_url: Option<String>,
    ) -> Self {
        Self {
            article_id: article_id.into(),
            text: text.into(),
            thumbnail_url: thumbnail_url.filter(|t| !t.trim().is_empty()),
        }
    }
}

impl From<String> for ArticleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
