//! HTTP front door for the narration video worker.
//!
//! This crate provides:
//! - The authenticated job submission endpoint
//! - Liveness and readiness probes
//! - Security headers, request ids and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
