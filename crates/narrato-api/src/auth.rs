//! Shared-secret authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::warn;

use narrato_models::API_KEY_HEADER;

use crate::error::ApiError;
use crate::state::AppState;

/// Proof that the request carried the configured `x-api-key`.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

/// Axum extractor rejecting requests without the shared secret.
#[axum::async_trait]
impl FromRequestParts<AppState> for AdminKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if key_matches(provided, &state.config.admin_api_key) {
            Ok(AdminKey)
        } else {
            warn!(path = %parts.uri.path(), "Rejected request with missing or invalid API key");
            Err(ApiError::forbidden("Invalid API key"))
        }
    }
}

fn key_matches(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(key) => !expected.is_empty() && key == expected,
        None => false,
    }
}
