//! Per-job temporary files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use narrato_models::ArticleId;

/// The intermediate files one job may leave in the temp directory.
///
/// `cleanup` is the normal path. If the owning future is dropped before it
/// runs, `Drop` removes the files synchronously.
#[derive(Debug)]
pub struct JobArtifacts {
    audio: PathBuf,
    video: PathBuf,
    cleaned: bool,
}

impl JobArtifacts {
    pub fn new(temp_dir: &Path, article_id: &ArticleId) -> Self {
        Self {
            audio: temp_dir.join(format!("{}_audio.wav", article_id)),
            video: temp_dir.join(format!("{}_final.mp4", article_id)),
            cleaned: false,
        }
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio
    }

    pub fn video_path(&self) -> &Path {
        &self.video
    }

    /// Delete whichever of the files exist. Returns how many were removed.
    ///
    /// A file that cannot be deleted is logged and skipped.
    pub async fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in [&self.audio, &self.video] {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    debug!("Removed temp file {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
            }
        }
        self.cleaned = true;
        removed
    }
}

impl Drop for JobArtifacts {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        for path in [&self.audio, &self.video] {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_article_id() {
        let artifacts = JobArtifacts::new(Path::new("/tmp/work"), &ArticleId::from("A1"));
        assert_eq!(artifacts.audio_path(), Path::new("/tmp/work/A1_audio.wav"));
        assert_eq!(artifacts.video_path(), Path::new("/tmp/work/A1_final.mp4"));
    }

    #[tokio::test]
    async fn test_cleanup_removes_existing_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifacts = JobArtifacts::new(dir.path(), &ArticleId::from("A1"));
        std::fs::write(artifacts.audio_path(), b"wav").unwrap();

        assert_eq!(artifacts.cleanup().await, 1);
        assert!(!artifacts.audio_path().exists());
        assert!(!artifacts.video_path().exists());
    }

    #[tokio::test]
    async fn test_cleanup_leaves_other_jobs_alone() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("B2_audio.wav");
        std::fs::write(&other, b"wav").unwrap();

        let mut artifacts = JobArtifacts::new(dir.path(), &ArticleId::from("A1"));
        std::fs::write(artifacts.video_path(), b"mp4").unwrap();
        artifacts.cleanup().await;

        assert!(other.exists());
    }

    #[test]
    fn test_drop_removes_files_when_not_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = JobArtifacts::new(dir.path(), &ArticleId::from("A1"));
        let audio = artifacts.audio_path().to_path_buf();
        let video = artifacts.video_path().to_path_buf();
        std::fs::write(&audio, b"wav").unwrap();
        std::fs::write(&video, b"mp4").unwrap();

        drop(artifacts);
        assert!(!audio.exists());
        assert!(!video.exists());
    }
}
