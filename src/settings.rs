use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canvas::Rgb;
use crate::error::SettingsError;

pub const DEFAULT_SETTINGS_PATH: &str = "spraypaint.json";

fn default_thickness() -> f64 {
    1.0
}

fn default_window_width() -> u32 {
    1024
}

fn default_window_height() -> u32 {
    768
}

/// Persistent user settings, stored as JSON next to the executable's cwd
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Keep the background loaded across sessions
    #[serde(default)]
    pub keep_background: bool,
    /// Background reloaded on start when `keep_background` was set
    #[serde(default)]
    pub last_image: Option<PathBuf>,
    #[serde(default = "default_color")]
    pub color: Rgb,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    #[serde(default)]
    pub export_path: Option<PathBuf>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

fn default_color() -> Rgb {
    Rgb::BLACK
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            keep_background: false,
            last_image: None,
            color: default_color(),
            thickness: default_thickness(),
            export_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl Settings {
    /// Load settings from JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to JSON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spraypaint.json");
        let settings = Settings {
            keep_background: true,
            last_image: Some(PathBuf::from("photo.png")),
            color: Rgb(10, 20, 30),
            thickness: 12.5,
            export_path: Some(PathBuf::from("out.png")),
            window_width: 800,
            window_height: 600,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spraypaint.json");
        std::fs::write(&path, r#"{ "keep_background": true }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert!(settings.keep_background);
        assert_eq!(settings.thickness, 1.0);
        assert_eq!(settings.window_width, 1024);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spraypaint.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Json(_))));
    }
}
