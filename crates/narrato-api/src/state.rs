//! Application state.

use std::sync::Arc;

use narrato_media::AvatarSelector;
use narrato_storage::R2Client;
use narrato_worker::JobPipeline;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<JobPipeline>,
    /// Presenter pool, checked by readiness
    pub avatars: AvatarSelector,
    /// Storage client for the readiness probe; `None` skips that check
    pub storage: Option<Arc<R2Client>>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        pipeline: Arc<JobPipeline>,
        avatars: AvatarSelector,
        storage: Option<Arc<R2Client>>,
    ) -> Self {
        Self {
            config,
            pipeline,
            avatars,
            storage,
        }
    }
}
