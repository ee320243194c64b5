//! Remote asset storage for finished videos.
//!
//! This crate provides:
//! - The `AssetUploader` seam used by the job pipeline
//! - A Cloudflare R2 client (S3 API)
//! - An R2-backed uploader with stable, overwriting public ids

pub mod client;
pub mod error;
pub mod uploader;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use uploader::{AssetUploader, R2Uploader, UploadedAsset, DEFAULT_UPLOAD_FOLDER};
