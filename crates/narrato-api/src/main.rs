//! Narration worker binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use narrato_api::{create_router, metrics, ApiConfig, AppState};
use narrato_media::{check_program, AvatarSelector, CoquiSynthesizer, FfmpegComposer};
use narrato_storage::{R2Client, R2Config, R2Uploader};
use narrato_worker::{HttpNotifier, JobPipeline, NotifierConfig, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    init_tracing();

    info!("Starting narrato-api");

    if let Err(e) = run().await {
        error!("Fatal: {:#}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("narrato=info,tower_http=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    // Required settings first, so a misconfigured deployment fails before binding.
    let config = ApiConfig::from_env()?;
    let notifier_config = NotifierConfig::from_env()?;
    let r2_config = R2Config::from_env()?;
    let worker_config = WorkerConfig::from_env();

    info!(
        "API config: host={}, port={}, avatars={}, temp={}",
        config.host,
        config.port,
        worker_config.avatar_dir.display(),
        worker_config.temp_dir.display()
    );

    worker_config
        .ensure_dirs()
        .await
        .context("failed to create avatar/temp directories")?;

    preflight(&worker_config).await;

    let storage = R2Client::new(r2_config);
    let avatars = AvatarSelector::new(&worker_config.avatar_dir);

    let pipeline = JobPipeline::new(
        &worker_config.temp_dir,
        Arc::new(CoquiSynthesizer::new(worker_config.tts.clone())),
        Arc::new(FfmpegComposer::new(
            avatars.clone(),
            worker_config.composer.clone(),
        )),
        Arc::new(R2Uploader::new(
            storage.clone(),
            worker_config.upload_folder.clone(),
        )),
        Arc::new(HttpNotifier::new(notifier_config)?),
    );

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("failed to install metrics recorder")?)
    } else {
        None
    };

    let pipeline = Arc::new(pipeline);
    let state = AppState::new(
        config.clone(),
        Arc::clone(&pipeline),
        avatars,
        Some(Arc::new(storage)),
    );
    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid bind address")?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Accepted jobs still owe a callback; let them finish before exiting.
    pipeline.shutdown().await;

    Ok(())
}

/// Warn about missing tools and an empty avatar pool. Jobs still get
/// accepted; they fail at the affected stage.
async fn preflight(config: &WorkerConfig) {
    for program in [&config.tts.program, &config.composer.program] {
        match check_program(program) {
            Ok(path) => info!("Found {} at {}", program, path.display()),
            Err(e) => warn!("{}", e),
        }
    }

    match AvatarSelector::new(&config.avatar_dir).list().await {
        Ok(clips) if clips.is_empty() => warn!(
            "No avatars in {}; every job will fail until clips are added",
            config.avatar_dir.display()
        ),
        Ok(clips) => info!("{} avatar clip(s) available", clips.len()),
        Err(e) => warn!("Could not list avatars: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
