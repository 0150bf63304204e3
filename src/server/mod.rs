use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::audio::Instrument;
use crate::detector::HandResults;
use crate::persistence;
use crate::state::AppState;

/// Reads the index markup once from the static root. The served page is a
/// fixed snapshot for the process lifetime.
pub fn load_index(static_root: &FsPath) -> Result<String> {
    let path = static_root.join("index.html");
    std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read index page {}", path.display()))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/{*path}", get(static_asset))
        .route("/api/instrument", post(set_instrument))
        .route("/api/results", post(submit_results))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index_html.to_string())
}

#[derive(Debug, Deserialize)]
struct InstrumentRequest {
    instrument: Instrument,
}

#[derive(Debug, Serialize)]
struct InstrumentResponse {
    instrument: Instrument,
    sounds_loaded: usize,
}

/// Switches the active instrument: reloads its sound bank, resets the
/// trigger's re-arm state and persists the choice.
async fn set_instrument(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InstrumentRequest>,
) -> Json<InstrumentResponse> {
    let instrument = request.instrument;
    let static_root = {
        let settings = state.settings.lock().unwrap();
        settings.server.static_root.clone()
    };

    let sounds_loaded = state
        .player
        .load_instrument_sounds(&static_root, instrument)
        .await;
    state.trigger.lock().unwrap().set_instrument(instrument);

    let (settings, testing) = {
        let mut settings = state.settings.lock().unwrap();
        settings.audio.instrument = instrument;
        (settings.clone(), settings.general.testing)
    };
    // Test clients must not touch the user's stored settings
    if !testing {
        if let Err(e) = persistence::save_settings(&settings) {
            tracing::warn!("Failed to persist settings: {:#}", e);
        }
    }

    tracing::info!("Active instrument switched to {:?}", instrument);
    Json(InstrumentResponse {
        instrument,
        sounds_loaded,
    })
}

/// Ingests one frame's landmark results from a client that mirrors its
/// detector output, driving the native gesture trigger.
async fn submit_results(
    State(state): State<Arc<AppState>>,
    Json(results): Json<HandResults>,
) -> StatusCode {
    state.trigger.lock().unwrap().on_results(&results);
    StatusCode::NO_CONTENT
}

async fn static_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    let Some(rel) = sanitize(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let full = {
        let settings = state.settings.lock().unwrap();
        settings.server.static_root.join(rel)
    };

    match tokio::fs::read(&full).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Rejects any request path that would escape the static root.
fn sanitize(path: &str) -> Option<PathBuf> {
    let rel = PathBuf::from(path);
    if rel.components().all(|c| matches!(c, Component::Normal(_)))
        && !rel.as_os_str().is_empty()
    {
        Some(rel)
    } else {
        None
    }
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("wav") => "audio/wav",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
