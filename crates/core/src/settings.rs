//! Settings persistence
//!
//! A small JSON file in the platform config directory:
//!
//! - **Linux**: `~/.config/mathpaste/settings.json`
//! - **macOS**: `~/Library/Application Support/mathpaste/settings.json`
//! - **Windows**: `%APPDATA%\mathpaste\settings.json`
//!
//! Loaded at startup (a missing file is fine) and written at shutdown.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::zoom::ZOOM_DEFAULT;

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "mathpaste";

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Zoom in percent
    pub zoom: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self { zoom: ZOOM_DEFAULT }
    }
}

/// Settings plus the file they live in
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(settings_path()?))
    }

    /// Load from `path`
    ///
    /// A missing file gives defaults; an unreadable one is logged and also
    /// gives defaults, so a broken settings file never blocks startup.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match read_settings(&path) {
            Ok(settings) => settings,
            Err(CoreError::Io(e)) if e.kind() == ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                tracing::warn!("Ignoring settings in {}: {}", path.display(), e);
                Settings::default()
            }
        };
        Self { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Write settings, creating the directory if needed
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.path, data)?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Default settings file location
pub fn settings_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or(CoreError::NoConfigDir)?;
    Ok(base.join(APP_DIR).join(SETTINGS_FILE))
}

fn read_settings(path: &Path) -> Result<Settings> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::load_from(dir.path().join("settings.json"));
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(store.settings().zoom, 100);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::load_from(&path);
        store.settings_mut().zoom = 150;
        store.save().unwrap();

        let reloaded = SettingsStore::load_from(&path);
        assert_eq!(reloaded.settings().zoom, 150);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::load_from(&path);
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn test_unknown_and_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = SettingsStore::load_from(&path);
        assert_eq!(store.settings().zoom, 100);
    }

    #[test]
    fn test_settings_path_ends_with_app_dir() {
        if let Ok(path) = settings_path() {
            assert!(path.ends_with("mathpaste/settings.json"));
        }
    }
}
