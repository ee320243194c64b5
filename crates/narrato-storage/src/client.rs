//! R2 client implementation.

use std::collections::HashMap;
use std::path::Path;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for R2 client.
#[derive(Debug, Clone)]
pub struct R2Config {
    /// R2 endpoint URL (S3 API endpoint)
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region (usually "auto" for R2)
    pub region: String,
    /// Public base URL the bucket is served from (custom domain or r2.dev)
    pub public_url: String,
}

impl R2Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: required_env("R2_ENDPOINT_URL")?,
            access_key_id: required_env("R2_ACCESS_KEY_ID")?,
            secret_access_key: required_env("R2_SECRET_ACCESS_KEY")?,
            bucket_name: required_env("R2_BUCKET_NAME")?,
            region: std::env::var("R2_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_url: required_env("R2_PUBLIC_URL")?,
        })
    }
}

fn required_env(name: &str) -> StorageResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(StorageError::config_error(format!("{} not set", name))),
    }
}

/// Cloudflare R2 storage client.
#[derive(Clone)]
pub struct R2Client {
    client: Client,
    bucket: String,
    public_url: String,
}

impl R2Client {
    /// Create a new R2 client from configuration.
    pub fn new(config: R2Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "r2",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            public_url: config.public_url,
        }
    }

    /// Upload a file to R2, replacing any object already stored under `key`.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .set_metadata(if metadata.is_empty() { None } else { Some(metadata) })
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(())
    }

    /// Public URL of an object.
    pub fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_url, key)
    }

    /// Check connectivity to R2 by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("R2 connectivity check failed: {}", e)))?;
        Ok(())
    }
}

pub(crate) fn join_public_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
