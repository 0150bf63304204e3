pub mod playback;

pub use playback::{NotePlayer, OutputSink, RodioSink};

use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Decoded, ready-to-play audio sample data. Created at most once per asset
/// and never mutated afterward; shared read-only between triggers.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn duration_ms(&self) -> u64 {
        let frames = self.samples.len() as u64 / self.channels.max(1) as u64;
        frames * 1000 / self.sample_rate.max(1) as u64
    }
}

/// Instrument selection for the gesture-to-sound mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Piano,
    Synthesizer,
}

impl Default for Instrument {
    fn default() -> Self {
        Self::Piano
    }
}

impl Instrument {
    /// Sound names and their asset paths relative to the static root.
    pub fn sound_files(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Instrument::Piano => &[
                ("piano_a", "audio/piano/piano-a.wav"),
                ("piano_b", "audio/piano/piano-b.wav"),
                ("piano_c", "audio/piano/piano-c.wav"),
                ("piano_d", "audio/piano/piano-d.wav"),
                ("piano_e", "audio/piano/piano-e.wav"),
            ],
            Instrument::Synthesizer => &[("note", "audio/synthesizer/note.wav")],
        }
    }
}

/// Decodes a WAV file into an `AudioBuffer`, normalizing integer samples
/// to f32 in [-1.0, 1.0].
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .context("Failed to parse WAV header")?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to decode float WAV samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to decode integer WAV samples")?
        }
    };

    if samples.is_empty() {
        bail!("WAV file contains no samples");
    }

    Ok(AudioBuffer {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

const NOTE_FREQ_HZ: f32 = 440.0;
const NOTE_DURATION_S: f32 = 0.4;
const NOTE_SAMPLE_RATE: u32 = 44100;

/// Pitches for the five piano notes, thumb through pinky (A4 to E5).
const PIANO_FREQS_HZ: [f32; 5] = [440.0, 493.88, 523.25, 587.33, 659.25];

/// Synthesizes every missing default asset so a fresh checkout serves a
/// playable `note.wav` and a fully populated instrument bank.
pub fn ensure_default_assets(static_root: &Path, note_path: &str) -> Result<()> {
    write_note_if_missing(&static_root.join(note_path), NOTE_FREQ_HZ)?;

    let piano = Instrument::Piano.sound_files();
    for (freq, (_name, rel_path)) in PIANO_FREQS_HZ.iter().zip(piano) {
        write_note_if_missing(&static_root.join(rel_path), *freq)?;
    }
    for (_name, rel_path) in Instrument::Synthesizer.sound_files() {
        write_note_if_missing(&static_root.join(rel_path), NOTE_FREQ_HZ)?;
    }
    Ok(())
}

fn write_note_if_missing(path: &Path, freq_hz: f32) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create asset directory {}", parent.display()))?;
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: NOTE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create note asset {}", path.display()))?;

    let total = (NOTE_DURATION_S * NOTE_SAMPLE_RATE as f32) as u32;
    for n in 0..total {
        let t = n as f32 / NOTE_SAMPLE_RATE as f32;
        // Linear fade-out avoids a click at the end of the note
        let envelope = 1.0 - t / NOTE_DURATION_S;
        let value = (2.0 * std::f32::consts::PI * freq_hz * t).sin() * 0.5 * envelope;
        writer.write_sample((value * i16::MAX as f32) as i16)?;
    }
    writer.finalize().context("Failed to finalize note asset")?;

    tracing::info!("Wrote default note asset to {}", path.display());
    Ok(())
}
