use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::audio::{Instrument, NotePlayer};
use crate::trigger::GestureTrigger;

/// Process-scoped shared state: settings, the singleton playback unit and
/// the gesture trigger, initialized once at startup and passed by reference
/// thereafter.
pub struct AppState {
    pub settings: Mutex<Settings>,
    pub player: Arc<NotePlayer>,
    pub trigger: Mutex<GestureTrigger>,
    /// Index markup, read once at startup. Serving a fixed snapshot keeps
    /// repeated responses byte-identical.
    pub index_html: Arc<str>,
}

impl AppState {
    pub fn new(settings: Settings, player: Arc<NotePlayer>, index_html: String) -> Self {
        let trigger = GestureTrigger::new(
            Arc::clone(&player),
            settings.audio.instrument,
            settings.trigger.clone(),
        );
        Self {
            settings: Mutex::new(settings),
            player,
            trigger: Mutex::new(trigger),
            index_html: Arc::from(index_html),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub audio: AudioSettings,
    pub trigger: TriggerSettings,
    pub general: GeneralSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            audio: AudioSettings::default(),
            trigger: TriggerSettings::default(),
            general: GeneralSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub static_root: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            static_root: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    pub instrument: Instrument,
    /// Note asset path relative to the static root.
    pub note_path: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            instrument: Instrument::default(),
            note_path: "audio/note.wav".to_string(),
        }
    }
}

/// Geometry thresholds for the gesture predicates, normalized to [0, 1]
/// video coordinates. The defaults may need tuning per camera setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSettings {
    /// Vertical press thresholds for index, middle, ring and pinky tips.
    pub finger_y: [f32; 4],
    /// Horizontal tolerance for the thumb inward-curl test.
    pub thumb_curl_x: f32,
    /// How far the index tip must rise above the PIP joint to count as curled.
    pub index_curl_margin: f32,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            finger_y: [0.6, 0.6, 0.6, 0.55],
            thumb_curl_x: 0.02,
            index_curl_margin: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Test-mode flag; must never change the served markup.
    pub testing: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self { testing: false }
    }
}
