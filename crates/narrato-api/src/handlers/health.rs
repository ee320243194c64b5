//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub avatars: CheckStatus,
    pub temp_dir: CheckStatus,
    pub storage: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn skipped() -> Self {
        Self {
            status: "skipped".to_string(),
            error: None,
            latency_ms: None,
        }
    }

    fn is_healthy(&self) -> bool {
        self.status != "error"
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the avatar pool, the temp directory and R2.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let avatars_check = {
        let start = Instant::now();
        match state.avatars.list().await {
            Ok(clips) if !clips.is_empty() => CheckStatus::ok(start.elapsed().as_millis() as u64),
            Ok(_) => CheckStatus::error(format!(
                "no avatars available in {}",
                state.avatars.dir().display()
            )),
            Err(e) => CheckStatus::error(e.to_string()),
        }
    };

    let temp_dir_check = {
        let start = Instant::now();
        let dir = state.pipeline.temp_dir();
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => CheckStatus::ok(start.elapsed().as_millis() as u64),
            Ok(_) => CheckStatus::error(format!("{} is not a directory", dir.display())),
            Err(e) => CheckStatus::error(format!("{}: {}", dir.display(), e)),
        }
    };

    let storage_check = match &state.storage {
        Some(storage) => {
            let start = Instant::now();
            match storage.check_connectivity().await {
                Ok(_) => CheckStatus::ok(start.elapsed().as_millis() as u64),
                Err(e) => CheckStatus::error(e.to_string()),
            }
        }
        None => CheckStatus::skipped(),
    };

    let all_ok = avatars_check.is_healthy()
        && temp_dir_check.is_healthy()
        && storage_check.is_healthy();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            avatars: avatars_check,
            temp_dir: temp_dir_check,
            storage: storage_check,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
