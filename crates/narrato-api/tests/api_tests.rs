//! API integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Semaphore};
use tower::ServiceExt;

use narrato_api::{create_router, ApiConfig, AppState};
use narrato_media::{AvatarSelector, MediaResult, SpeechSynthesizer, VideoComposer};
use narrato_models::{ArticleId, PipelineOutcome};
use narrato_storage::{AssetUploader, StorageResult, UploadedAsset};
use narrato_worker::{CompletionNotifier, JobPipeline};

const API_KEY: &str = "test-secret";

/// Synthesizer that waits for a permit, so tests can hold a job mid-flight.
struct GatedSynthesizer {
    gate: Arc<Semaphore>,
}

#[async_trait]
impl SpeechSynthesizer for GatedSynthesizer {
    async fn synthesize(&self, _text: &str, output: &Path) -> MediaResult<PathBuf> {
        let _permit = self.gate.acquire().await.expect("gate closed");
        tokio::fs::write(output, b"wav").await?;
        Ok(output.to_path_buf())
    }
}

struct CopyComposer;

#[async_trait]
impl VideoComposer for CopyComposer {
    async fn compose(&self, audio: &Path, output: &Path) -> MediaResult<PathBuf> {
        tokio::fs::copy(audio, output).await?;
        Ok(output.to_path_buf())
    }
}

struct CdnUploader;

#[async_trait]
impl AssetUploader for CdnUploader {
    async fn upload(
        &self,
        _video: &Path,
        asset_id: &str,
        _poster: Option<&str>,
    ) -> StorageResult<UploadedAsset> {
        Ok(UploadedAsset {
            url: format!("https://cdn/x/{}.mp4", asset_id),
            key: format!("x/{}.mp4", asset_id),
        })
    }
}

struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(ArticleId, PipelineOutcome)>,
}

#[async_trait]
impl CompletionNotifier for ChannelNotifier {
    async fn notify(&self, article_id: &ArticleId, outcome: &PipelineOutcome) {
        let _ = self.tx.send((article_id.clone(), outcome.clone()));
    }
}

struct TestApp {
    router: Router,
    gate: Arc<Semaphore>,
    notifications: mpsc::UnboundedReceiver<(ArticleId, PipelineOutcome)>,
    temp: tempfile::TempDir,
    _avatars: tempfile::TempDir,
}

fn create_test_app(with_avatar: bool) -> TestApp {
    let temp = tempfile::tempdir().unwrap();
    let avatars = tempfile::tempdir().unwrap();
    if with_avatar {
        std::fs::write(avatars.path().join("presenter.mp4"), b"clip").unwrap();
    }

    let gate = Arc::new(Semaphore::new(0));
    let (tx, notifications) = mpsc::unbounded_channel();

    let pipeline = JobPipeline::new(
        temp.path(),
        Arc::new(GatedSynthesizer { gate: gate.clone() }),
        Arc::new(CopyComposer),
        Arc::new(CdnUploader),
        Arc::new(ChannelNotifier { tx }),
    );

    let config = ApiConfig {
        admin_api_key: API_KEY.to_string(),
        metrics_enabled: false,
        ..ApiConfig::default()
    };

    let state = AppState::new(
        config,
        Arc::new(pipeline),
        AvatarSelector::new(avatars.path()),
        None,
    );

    TestApp {
        router: create_router(state, None),
        gate,
        notifications,
        temp,
        _avatars: avatars,
    }
}

fn generate_request(api_key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/generate-video")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(true);

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app(true);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("X-Request-ID", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_ready_with_avatars() {
    let app = create_test_app(true);

    let response = app
        .router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["storage"]["status"], "skipped");
}

#[tokio::test]
async fn test_ready_degraded_without_avatars() {
    let app = create_test_app(false);

    let response = app
        .router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["avatars"]["status"], "error");
}

#[tokio::test]
async fn test_missing_api_key_is_forbidden() {
    let mut app = create_test_app(true);

    let response = app
        .router
        .clone()
        .oneshot(generate_request(
            None,
            json!({"text": "Hello world", "articleId": "A1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_json(response).await["detail"].is_string());

    app.gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.notifications.try_recv().is_err());
}

#[tokio::test]
async fn test_wrong_api_key_is_forbidden() {
    let app = create_test_app(true);

    let response = app
        .router
        .oneshot(generate_request(
            Some("nope"),
            json!({"text": "Hello world", "articleId": "A1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_body_is_bad_request() {
    let app = create_test_app(true);

    for body in [
        json!({"articleId": "A1"}),
        json!({"text": "", "articleId": "A1"}),
        json!({"text": "Hello", "articleId": "../etc"}),
        json!({"text": "Hello", "articleId": "A1", "thumbnailUrl": "ftp://x/t.jpg"}),
    ] {
        let response = app
            .router
            .clone()
            .oneshot(generate_request(Some(API_KEY), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/generate-video")
                .header("content-type", "application/json")
                .header("x-api-key", API_KEY)
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_accepts_before_pipeline_runs() {
    let mut app = create_test_app(true);

    let response = app
        .router
        .clone()
        .oneshot(generate_request(
            Some(API_KEY),
            json!({
                "text": "Hello world",
                "articleId": "A1",
                "thumbnailUrl": "http://x/thumb.jpg"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["articleId"], "A1");
    assert_eq!(body["message"], "Video processing started");

    // Synthesis is still parked on the gate, so nothing was reported yet.
    assert!(app.notifications.try_recv().is_err());

    app.gate.add_permits(1);
    let (article_id, outcome) = tokio::time::timeout(Duration::from_secs(5), app.notifications.recv())
        .await
        .expect("pipeline did not finish")
        .expect("notifier dropped");

    assert_eq!(article_id.as_str(), "A1");
    assert_eq!(
        outcome,
        PipelineOutcome::success("https://cdn/x/A1.mp4", Some("http://x/thumb.jpg".to_string()))
    );

    // Cleanup runs right after the notification.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(std::fs::read_dir(app.temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_accepts_spanish_field_names() {
    let mut app = create_test_app(true);

    let response = app
        .router
        .clone()
        .oneshot(generate_request(
            Some(API_KEY),
            json!({"texto": "Hola mundo", "articleId": "A2", "miniaturaUrl": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.gate.add_permits(1);
    let (_, outcome) = tokio::time::timeout(Duration::from_secs(5), app.notifications.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, PipelineOutcome::success("https://cdn/x/A2.mp4", None));
}
