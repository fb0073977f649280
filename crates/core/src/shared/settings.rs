use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_IOU_THRESHOLD, SETTINGS_DIR_NAME, SETTINGS_FILE_NAME,
};
use crate::shared::error::Result;

/// Persisted defaults for an analysis run. Command-line flags take
/// precedence over every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub confidence: f64,
    pub iou_threshold: f64,
    pub teeth_model: Option<PathBuf>,
    pub anomaly_model: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub font: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            teeth_model: None,
            anomaly_model: None,
            catalog: None,
            font: None,
        }
    }
}

impl EngineSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads the user's settings, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed settings {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
