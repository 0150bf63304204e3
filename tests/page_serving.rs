use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use handnote::audio::{AudioBuffer, NotePlayer, OutputSink};
use handnote::server;
use handnote::state::{AppState, Settings};

struct NullSink;

impl OutputSink for NullSink {
    fn start_source(&self, _buffer: Arc<AudioBuffer>) -> Result<()> {
        Ok(())
    }
}

fn app(settings: Settings) -> axum::Router {
    let index_html = server::load_index(&settings.server.static_root).unwrap();
    let player = Arc::new(NotePlayer::new(Box::new(NullSink)));
    server::router(Arc::new(AppState::new(settings, player, index_html)))
}

async fn get_body(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

#[tokio::test]
async fn index_returns_200() {
    let (status, _body) = get_body(app(Settings::default()), "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn index_embeds_the_three_cdn_scripts() {
    let (status, body) = get_body(app(Settings::default()), "/").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("cdn.jsdelivr.net/npm/@mediapipe/hands/hands.js"));
    assert!(html.contains("cdn.jsdelivr.net/npm/@mediapipe/drawing_utils/drawing_utils.js"));
    assert!(html.contains("cdn.jsdelivr.net/npm/@mediapipe/camera_utils/camera_utils.js"));
}

#[tokio::test]
async fn repeated_requests_return_identical_content() {
    let (_status, first) = get_body(app(Settings::default()), "/").await;
    let (_status, second) = get_body(app(Settings::default()), "/").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn testing_mode_does_not_alter_markup() {
    let mut testing = Settings::default();
    testing.general.testing = true;

    let (_status, normal) = get_body(app(Settings::default()), "/").await;
    let (status, test_mode) = get_body(app(testing), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(normal, test_mode);
}

#[tokio::test]
async fn client_script_is_served() {
    let (status, body) = get_body(app(Settings::default()), "/static/js/main.js").await;
    assert_eq!(status, StatusCode::OK);

    let script = String::from_utf8(body).unwrap();
    assert!(script.contains("function onResults"));
}

#[tokio::test]
async fn missing_asset_is_404() {
    let (status, _body) = get_body(app(Settings::default()), "/static/js/missing.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_outside_static_root_is_404() {
    let (status, _body) = get_body(app(Settings::default()), "/static/../Cargo.toml").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
