use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::state::Settings;

const CONFIG_DIR: &str = "handnote";
const SETTINGS_FILE: &str = "settings.json";

fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(SETTINGS_FILE))
}

/// Loads settings from the platform config dir, falling back to defaults on
/// any failure. Startup must never be blocked by a bad settings file.
pub fn load_settings() -> Settings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => {
            tracing::warn!("No config directory available. Using default settings.");
            Settings::default()
        }
    }
}

fn load_settings_from(path: &Path) -> Settings {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            tracing::info!("No stored settings found. Using defaults.");
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&contents) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to deserialize stored settings: {}. Using defaults.", e);
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = settings_path().context("No config directory available")?;
    save_settings_to(settings, &path)
}

fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    Ok(())
}
