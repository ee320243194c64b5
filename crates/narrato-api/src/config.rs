//! API configuration.

use anyhow::{bail, Result};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Shared secret expected in `x-api-key`
    pub admin_api_key: String,
    /// Serve Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            admin_api_key: String::new(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let admin_api_key = match lookup("ADMIN_API_KEY") {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!("ADMIN_API_KEY not set"),
        };

        Ok(Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: lookup("MAX_BODY_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            admin_api_key,
            metrics_enabled: lookup("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        })
    }
}
