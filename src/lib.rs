pub mod audio;
pub mod detector;
pub mod persistence;
pub mod server;
pub mod state;
pub mod tracker;
pub mod trigger;

use std::sync::Arc;

use anyhow::{Context, Result};

use audio::{NotePlayer, RodioSink};
use state::AppState;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting handnote v{}", env!("CARGO_PKG_VERSION"));

    let settings = persistence::load_settings();
    let static_root = settings.server.static_root.clone();
    let note_path = static_root.join(&settings.audio.note_path);

    // A fresh checkout ships no audio; synthesize the note and the
    // instrument banks so every sound is playable from the first boot
    audio::ensure_default_assets(&static_root, &settings.audio.note_path)?;

    let sink = RodioSink::spawn()?;
    let player = Arc::new(NotePlayer::new(Box::new(sink)));

    // The page must still serve if the asset fails to decode; triggers stay
    // gated until a later load succeeds
    if let Err(e) = player.load_note_sound(&note_path).await {
        tracing::warn!("Note sound unavailable: {:#}", e);
    }
    player
        .load_instrument_sounds(&static_root, settings.audio.instrument)
        .await;

    let index_html = server::load_index(&static_root)?;
    let bind_addr = settings.server.bind_addr.clone();
    let state = Arc::new(AppState::new(settings, player, index_html));

    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
