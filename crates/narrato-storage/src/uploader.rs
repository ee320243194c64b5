//! Asset upload seam and its R2 implementation.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::client::R2Client;
use crate::error::{StorageError, StorageResult};

/// Default key prefix for uploaded videos.
pub const DEFAULT_UPLOAD_FOLDER: &str = "article-videos";

/// Object metadata key carrying the poster image reference.
pub const POSTER_METADATA_KEY: &str = "poster-url";

/// Content type of uploaded videos.
const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// A successfully stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Durable public URL
    pub url: String,
    /// Storage key
    pub key: String,
}

/// Publishes a finished video under a stable id.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    /// Upload `video` as `asset_id`, replacing any previous asset with that id.
    ///
    /// When `poster` is given the provider is asked to associate it as the
    /// video's preview image.
    async fn upload(
        &self,
        video: &Path,
        asset_id: &str,
        poster: Option<&str>,
    ) -> StorageResult<UploadedAsset>;
}

/// Uploader writing to a Cloudflare R2 bucket.
#[derive(Clone)]
pub struct R2Uploader {
    client: R2Client,
    folder: String,
}

impl R2Uploader {
    pub fn new(client: R2Client, folder: impl Into<String>) -> Self {
        Self {
            client,
            folder: folder.into(),
        }
    }

    /// Storage key for an asset id.
    pub fn asset_key(&self, asset_id: &str) -> StorageResult<String> {
        asset_key(&self.folder, asset_id)
    }
}

#[async_trait]
impl AssetUploader for R2Uploader {
    async fn upload(
        &self,
        video: &Path,
        asset_id: &str,
        poster: Option<&str>,
    ) -> StorageResult<UploadedAsset> {
        let key = self.asset_key(asset_id)?;
        info!("[R2] Uploading {} as {}", video.display(), key);

        self.client
            .upload_file(video, &key, VIDEO_CONTENT_TYPE, poster_metadata(poster))
            .await?;

        Ok(UploadedAsset {
            url: self.client.public_url(&key),
            key,
        })
    }
}

/// Build `<folder>/<asset_id>.mp4`.
pub fn asset_key(folder: &str, asset_id: &str) -> StorageResult<String> {
    if asset_id.is_empty() || asset_id.contains(['/', '\\']) || asset_id.contains("..") {
        return Err(StorageError::InvalidKey(asset_id.to_string()));
    }

    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        Ok(format!("{}.mp4", asset_id))
    } else {
        Ok(format!("{}/{}.mp4", folder, asset_id))
    }
}

fn poster_metadata(poster: Option<&str>) -> HashMap<String, String> {
    poster
        .filter(|p| !p.is_empty())
        .map(|p| HashMap::from([(POSTER_METADATA_KEY.to_string(), p.to_string())]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_key() {
        assert_eq!(asset_key("article-videos", "A1").unwrap(), "article-videos/A1.mp4");
        assert_eq!(asset_key("/nested/folder/", "A1").unwrap(), "nested/folder/A1.mp4");
        assert_eq!(asset_key("", "A1").unwrap(), "A1.mp4");
    }

    #[test]
    fn test_asset_key_rejects_traversal() {
        assert!(matches!(asset_key("x", ""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(asset_key("x", "../A1"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(asset_key("x", "a/b"), Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let client = R2Client::new(crate::client::R2Config {
            endpoint_url: "http://127.0.0.1:9".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "videos".to_string(),
            region: "auto".to_string(),
            public_url: "https://cdn".to_string(),
        });
        let uploader = R2Uploader::new(client, DEFAULT_UPLOAD_FOLDER);

        let result = uploader
            .upload(&dir.path().join("A1_final.mp4"), "A1", None)
            .await;

        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_unsafe_id_before_reading_file() {
        let client = R2Client::new(crate::client::R2Config {
            endpoint_url: "http://127.0.0.1:9".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "videos".to_string(),
            region: "auto".to_string(),
            public_url: "https://cdn".to_string(),
        });
        let uploader = R2Uploader::new(client, DEFAULT_UPLOAD_FOLDER);

        let result = uploader.upload(Path::new("/nonexistent.mp4"), "../A1", None).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_poster_metadata() {
        let meta = poster_metadata(Some("http://x/thumb.jpg"));
        assert_eq!(meta.get(POSTER_METADATA_KEY).unwrap(), "http://x/thumb.jpg");

        assert!(poster_metadata(None).is_empty());
        assert!(poster_metadata(Some("")).is_empty());
    }
}
