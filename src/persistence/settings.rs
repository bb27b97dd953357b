//! Application settings
//!
//! Read from `<config dir>/padbind/settings.toml`. Missing files and missing
//! fields fall back to defaults so the dialog always starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const APP_DIR: &str = "padbind";
const SETTINGS_FILE: &str = "settings.toml";
const BINDINGS_FILE: &str = "input.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Identity of the input plugin whose sections are edited
    pub plugin_name: String,
    /// TOML file holding the binding sections
    pub bindings_file: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            plugin_name: "mupen64plus-input-sdl".to_string(),
            bindings_file: app_dir().join(BINDINGS_FILE),
        }
    }
}

impl AppSettings {
    /// Loads the settings file from the user's config directory
    pub fn load() -> Self {
        Self::load_from(&app_dir().join(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                info!(
                    "No settings at {} ({}), using defaults",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };

        match toml::from_str::<AppSettings>(&content) {
            Ok(settings) => {
                debug!("Loaded settings: {:?}", settings);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

fn app_dir() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        warn!("Could not determine config directory, using current directory");
        PathBuf::from(".")
    });
    base.join(APP_DIR)
}
