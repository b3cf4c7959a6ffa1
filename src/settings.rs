use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::selection::MonitorError;

/// Overrides the settings file location
pub const SETTINGS_PATH_ENV: &str = "SELECTION_MONITOR_SETTINGS";

const APP_DIR: &str = "selection-monitor";
const SETTINGS_FILE: &str = "settings.json";

fn default_true() -> bool {
    true
}

/// Applications in which no copy is ever synthesized
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IgnoreConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub ignored_applications: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ignored_applications: Vec::new(),
        }
    }
}

impl IgnoreConfig {
    /// Case-insensitive substring match; a trailing `.exe` on an entry is ignored
    pub fn should_ignore(&self, app_name: &str) -> bool {
        if !self.enabled || app_name.is_empty() {
            return false;
        }

        let app_name = app_name.to_lowercase();
        self.ignored_applications.iter().any(|entry| {
            let entry = entry.trim().to_lowercase().replace(".exe", "");
            !entry.is_empty() && app_name.contains(&entry)
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub text_selection_enabled: bool,
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_selection_enabled: true,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Settings {
    /// `$SELECTION_MONITOR_SETTINGS`, else `<config dir>/selection-monitor/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// A missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, MonitorError> {
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), MonitorError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
