//! Persisted scrubber settings.
//!
//! A flat record of numeric fields, each independently bounded, stored as
//! JSON under the platform config directory. Corrupted or missing stored
//! data falls back to defaults field by field: a wrong-typed `speed` never
//! poisons the rest of the record, and load failures never propagate past
//! this module.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// File name inside the config directory.
const SETTINGS_FILE: &str = "settings.json";

/// Inclusive bounds plus default for one settings field.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Bounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Normal playback speed.
pub const SPEED: Bounds = Bounds {
    min: 0.25,
    max: 2.0,
    default: 1.0,
};

/// Slow-motion playback speed.
pub const SLOW_MO_SPEED: Bounds = Bounds {
    min: 0.1,
    max: 0.75,
    default: 0.25,
};

/// Multiplier for the slow hold-to-scrub gesture.
pub const SCRUB_SPEED_SLOW: Bounds = Bounds {
    min: 0.1,
    max: 2.0,
    default: 0.5,
};

/// Multiplier for the fast hold-to-scrub gesture.
pub const SCRUB_SPEED_FAST: Bounds = Bounds {
    min: 1.0,
    max: 16.0,
    default: 4.0,
};

/// Errors from explicit settings persistence calls.
///
/// Loads never return these; they only surface from saves so the caller
/// can log the failure.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error("failed to write settings: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Scrubber settings persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub speed: f64,
    pub slow_mo_speed: f64,
    pub scrub_speed_slow: f64,
    pub scrub_speed_fast: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: SPEED.default,
            slow_mo_speed: SLOW_MO_SPEED.default,
            scrub_speed_slow: SCRUB_SPEED_SLOW.default,
            scrub_speed_fast: SCRUB_SPEED_FAST.default,
        }
    }
}

impl Settings {
    /// Path of the settings file under the platform config directory.
    pub fn path() -> Result<PathBuf, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(dir.join("vscrub").join(SETTINGS_FILE))
    }

    /// Load settings from the default location.
    ///
    /// Any failure (missing file, unreadable storage, malformed JSON)
    /// degrades to defaults.
    pub fn load() -> Self {
        match Self::path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Self::default(),
        }
    }

    /// Load from an explicit path, degrading to defaults on any failure.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_json(&raw),
            Err(_) => Self::default(),
        }
    }

    /// Decode settings from a JSON payload, field by field.
    ///
    /// Non-numeric or absent fields take their default; numeric fields are
    /// clamped to their documented bounds.
    pub fn from_json(raw: &str) -> Self {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => return Self::default(),
        };
        Self {
            speed: field(&parsed, "speed", SPEED),
            slow_mo_speed: field(&parsed, "slowMoSpeed", SLOW_MO_SPEED),
            scrub_speed_slow: field(&parsed, "scrubSpeedSlow", SCRUB_SPEED_SLOW),
            scrub_speed_fast: field(&parsed, "scrubSpeedFast", SCRUB_SPEED_FAST),
        }
    }

    /// Save settings to the default location, creating the directory if
    /// needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::path()?)
    }

    /// Save to an explicit path (tests and the console's storage override).
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }
}

fn field(parsed: &Value, key: &str, bounds: Bounds) -> f64 {
    match parsed.get(key).and_then(Value::as_f64) {
        Some(v) if v.is_finite() => bounds.clamp(v),
        _ => bounds.default,
    }
}
