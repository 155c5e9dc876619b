use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::relay::DEFAULT_RELAY_TIMEOUT;

pub const SETTINGS_FILE: &str = "appgroup.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub show_tray_icon: bool,
    #[serde(default = "default_true")]
    pub run_at_startup: bool,
    #[serde(default)]
    pub use_grayscale_icon: bool,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Upper bound for each message of a relayed command, in milliseconds.
    #[serde(default = "default_relay_timeout_ms")]
    pub relay_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_relay_timeout_ms() -> u64 {
    DEFAULT_RELAY_TIMEOUT.as_millis() as u64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_tray_icon: true,
            run_at_startup: true,
            use_grayscale_icon: false,
            debug_logging: false,
            relay_timeout_ms: default_relay_timeout_ms(),
        }
    }
}

impl Settings {
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_millis(self.relay_timeout_ms.max(1))
    }
}

/// File-backed settings. Loading never fails: a missing or unreadable file
/// yields the defaults.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<local data dir>/AppGroup/appgroup.json`.
    pub fn default_location() -> Self {
        Self::new(crate::paths::app_data_dir().join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Settings {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "unable to read settings; using defaults");
                return Settings::default();
            }
        };
        if content.trim().is_empty() {
            return Settings::default();
        }
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "corrupt settings file; using defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
