use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;

use super::{decode_wav, AudioBuffer, Instrument};

/// Output seam for one-shot playback. Each call creates an independent
/// source that starts immediately at offset 0; overlapping sources mix.
pub trait OutputSink: Send + Sync {
    fn start_source(&self, buffer: Arc<AudioBuffer>) -> Result<()>;
}

/// Production sink: a dedicated thread owns the rodio output stream and
/// appends a detached one-shot `Sink` per requested source.
pub struct RodioSink {
    tx: mpsc::UnboundedSender<Arc<AudioBuffer>>,
}

impl RodioSink {
    pub fn spawn() -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<AudioBuffer>>();

        std::thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let stream = match rodio::OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(e) => {
                        tracing::error!("Failed to open audio output device: {}", e);
                        return;
                    }
                };
                tracing::info!("Audio output stream opened");

                while let Some(buffer) = rx.blocking_recv() {
                    let source = rodio::buffer::SamplesBuffer::new(
                        buffer.channels,
                        buffer.sample_rate,
                        buffer.samples.clone(),
                    );
                    let sink = rodio::Sink::connect_new(stream.mixer());
                    sink.append(source);
                    // One-shot: the detached sink plays to completion and is dropped
                    sink.detach();
                }
            })
            .context("Failed to spawn audio output thread")?;

        Ok(Self { tx })
    }
}

impl OutputSink for RodioSink {
    fn start_source(&self, buffer: Arc<AudioBuffer>) -> Result<()> {
        self.tx
            .send(buffer)
            .map_err(|_| anyhow!("Audio output thread has exited"))
    }
}

/// Owns the decoded audio assets and creates playback sources on demand.
///
/// The single note buffer backs `play_note`; the per-instrument bank backs
/// `play_sound`. Buffers are decoded once and shared read-only afterward.
pub struct NotePlayer {
    sink: Box<dyn OutputSink>,
    note: RwLock<Option<Arc<AudioBuffer>>>,
    bank: RwLock<HashMap<Instrument, HashMap<String, Arc<AudioBuffer>>>>,
}

impl NotePlayer {
    pub fn new(sink: Box<dyn OutputSink>) -> Self {
        Self {
            sink,
            note: RwLock::new(None),
            bank: RwLock::new(HashMap::new()),
        }
    }

    /// Fetches and decodes the note asset. Must complete before `play_note`
    /// can succeed; a failure propagates to the caller without crashing.
    pub async fn load_note_sound(&self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read audio asset {}", path.display()))?;
        let buffer = decode_wav(&bytes)
            .with_context(|| format!("Failed to decode audio asset {}", path.display()))?;

        tracing::info!(
            "Note sound loaded: {} ({} ms, {} Hz)",
            path.display(),
            buffer.duration_ms(),
            buffer.sample_rate
        );
        *self.note.write().unwrap() = Some(Arc::new(buffer));
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.note.read().unwrap().is_some()
    }

    /// Starts a fresh one-shot source over the pre-decoded note buffer at
    /// offset 0. Fire-and-forget; each call produces an independent source.
    pub fn play_note(&self) -> Result<()> {
        let buffer = self
            .note
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("No note sound loaded"))?;
        self.sink.start_source(buffer)
    }

    /// Loads every sound the instrument defines, replacing any previous set.
    /// Individual failures are logged and skipped; returns the loaded count.
    pub async fn load_instrument_sounds(
        &self,
        static_root: &Path,
        instrument: Instrument,
    ) -> usize {
        let files = instrument.sound_files();
        let mut loaded = HashMap::new();

        for (name, rel_path) in files {
            let path = static_root.join(rel_path);
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) => decode_wav(&bytes),
                Err(e) => Err(anyhow!(e)),
            };
            match result {
                Ok(buffer) => {
                    loaded.insert((*name).to_string(), Arc::new(buffer));
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping sound '{}' for {:?} ({}): {}",
                        name,
                        instrument,
                        path.display(),
                        e
                    );
                }
            }
        }

        let count = loaded.len();
        tracing::info!(
            "Loaded {}/{} sounds for {:?}",
            count,
            files.len(),
            instrument
        );
        self.bank.write().unwrap().insert(instrument, loaded);
        count
    }

    /// Plays a named sound from the instrument bank. A missing sound is a
    /// warning, not an error.
    pub fn play_sound(&self, instrument: Instrument, name: &str) -> Result<()> {
        let buffer = self
            .bank
            .read()
            .unwrap()
            .get(&instrument)
            .and_then(|sounds| sounds.get(name))
            .cloned();

        match buffer {
            Some(buffer) => self.sink.start_source(buffer),
            None => {
                tracing::warn!("Sound '{}' not loaded for {:?}", name, instrument);
                Ok(())
            }
        }
    }
}
