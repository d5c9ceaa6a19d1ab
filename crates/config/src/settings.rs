// Application settings
// Loaded from ~/.config/metagrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// API connection defaults (credentials live in auth.json, not here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum entities fetched into one grid
    pub max_rows: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_rows: 500,
        }
    }
}

/// Grid editor behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Seconds before a status notification auto-hides
    pub notification_secs: u64,
    /// Show the row-number gutter
    pub row_numbers: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            notification_secs: 5,
            row_numbers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub grid: GridSettings,
}

impl Settings {
    /// Path to the settings file.
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|c| c.join("metagrid/settings.json"))
    }

    /// Load settings, falling back to defaults when the file is missing
    /// or invalid.
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Save settings, creating the parent directory if needed.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path().ok_or("Could not determine config directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(&path, contents).map_err(|e| format!("Failed to write settings: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.grid.notification_secs, 5);
        assert_eq!(s.api.timeout_secs, 60);
        assert_eq!(s.api.max_rows, 500);
        assert!(s.grid.row_numbers);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"grid": {"notification_secs": 10}}"#).unwrap();
        assert_eq!(s.grid.notification_secs, 10);
        assert!(s.grid.row_numbers);
        assert_eq!(s.api.max_rows, 500);
    }

    #[test]
    fn settings_round_trip() {
        let mut s = Settings::default();
        s.grid.notification_secs = 8;
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
