//! Presenter clip pool.

use std::path::{Path, PathBuf};

use rand::prelude::IndexedRandom;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Extension of usable presenter clips.
pub const AVATAR_EXTENSION: &str = "mp4";

/// Picks a presenter clip from a local directory.
///
/// Stateless: the directory is listed again on every call, so clips can be
/// added or removed without restarting the worker.
#[derive(Debug, Clone)]
pub struct AvatarSelector {
    dir: PathBuf,
}

impl AvatarSelector {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List the clips in the pool, sorted by path.
    ///
    /// A missing directory is reported as an empty pool.
    pub async fn list(&self) -> MediaResult<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut avatars = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_avatar(&path) && entry.file_type().await?.is_file() {
                avatars.push(path);
            }
        }
        avatars.sort();

        Ok(avatars)
    }

    /// Pick one clip uniformly at random.
    pub async fn pick(&self) -> MediaResult<PathBuf> {
        let avatars = self.list().await?;
        debug!("Avatar pool {} has {} clips", self.dir.display(), avatars.len());

        avatars
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(MediaError::NoAvatars)
    }
}

fn is_avatar(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(AVATAR_EXTENSION))
}
