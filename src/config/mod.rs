// SPDX-License-Identifier: MPL-2.0
//! Editor configuration, loaded from and saved to a `settings.toml` file.
//!
//! All fields are optional in the file; missing values fall back to the
//! constants in [`defaults`]. Accessors clamp file values into their valid
//! ranges so a hand-edited file can never push the engine out of bounds.
//!
//! # Examples
//!
//! ```no_run
//! use framelens::config::{self, Config};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.output_multiplier = Some(3.0);
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "Framelens";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum zoom factor relative to the image's natural size.
    #[serde(default)]
    pub max_zoom: Option<f32>,
    /// Wheel zoom sensitivity (`factor = 1 - delta * k`).
    #[serde(default)]
    pub wheel_zoom_sensitivity: Option<f32>,
    /// Export raster size as a multiple of the frame size.
    #[serde(default)]
    pub output_multiplier: Option<f32>,
    /// Whether two-finger gestures may rotate the image.
    #[serde(default)]
    pub gesture_rotation: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_zoom: Some(defaults::MAX_ZOOM),
            wheel_zoom_sensitivity: Some(defaults::WHEEL_ZOOM_SENSITIVITY),
            output_multiplier: Some(defaults::OUTPUT_MULTIPLIER),
            gesture_rotation: Some(true),
        }
    }
}

impl Config {
    /// Maximum zoom with the file value clamped to a sane range.
    #[must_use]
    pub fn effective_max_zoom(&self) -> f32 {
        self.max_zoom
            .unwrap_or(defaults::MAX_ZOOM)
            .clamp(1.0, 32.0)
    }

    /// Wheel sensitivity clamped into its valid range.
    #[must_use]
    pub fn effective_wheel_sensitivity(&self) -> f32 {
        self.wheel_zoom_sensitivity
            .unwrap_or(defaults::WHEEL_ZOOM_SENSITIVITY)
            .clamp(
                defaults::MIN_WHEEL_ZOOM_SENSITIVITY,
                defaults::MAX_WHEEL_ZOOM_SENSITIVITY,
            )
    }

    /// Output multiplier clamped into its valid range.
    #[must_use]
    pub fn effective_output_multiplier(&self) -> f32 {
        self.output_multiplier
            .unwrap_or(defaults::OUTPUT_MULTIPLIER)
            .clamp(
                defaults::MIN_OUTPUT_MULTIPLIER,
                defaults::MAX_OUTPUT_MULTIPLIER,
            )
    }

    /// Whether rotation-by-gesture is enabled.
    #[must_use]
    pub fn effective_gesture_rotation(&self) -> bool {
        self.gesture_rotation.unwrap_or(true)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from the platform config directory.
pub fn load() -> Result<Config> {
    let path = get_default_config_path()
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
    load_from_path(&path)
}

/// Loads the configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
}

/// Saves the configuration to the platform config directory.
pub fn save(config: &Config) -> Result<()> {
    let path = get_default_config_path()
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
    save_to_path(config, &path)
}

/// Saves the configuration to a specific path, creating parent directories.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string(config).map_err(|e| Error::Config(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}
