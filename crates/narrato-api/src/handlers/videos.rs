//! Job submission handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;
use validator::Validate;

use narrato_models::{AcceptedResponse, GenerateVideoRequest};

use crate::auth::AdminKey;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Accept a narration job and start it in the background.
///
/// Responds as soon as the job is scheduled; the outcome is reported to the
/// upstream API by the pipeline, never in this response.
pub async fn generate_video(
    State(state): State<AppState>,
    _key: AdminKey,
    payload: Result<Json<GenerateVideoRequest>, JsonRejection>,
) -> ApiResult<Json<AcceptedResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    request.validate()?;

    let job = request.into_job();
    let response = AcceptedResponse::new(&job.article_id);

    info!(
        article_id = %job.article_id,
        has_thumbnail = job.thumbnail_url.is_some(),
        "Accepted video job"
    );
    metrics::record_job_accepted();

    state.pipeline.spawn(job);

    Ok(Json(response))
}
