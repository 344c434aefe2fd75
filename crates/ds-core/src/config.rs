//! Launch preferences (`docsim_config.json`).
//!
//! Remembers the breeder-HTML path and revision between runs so the game
//! can start without flags. Deleting the file is a reset; a corrupt file
//! is ignored rather than fatal.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Revision;

/// Default config file name, next to the working directory.
pub const CONFIG_FILE: &str = "docsim_config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not write config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Remembered launch preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breeder_html: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<Revision>,
}

impl LaunchConfig {
    /// Load the config; missing or unreadable files yield an empty config.
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            }
        }
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Remember a successful launch's inputs.
    pub fn remember(&mut self, breeder_html: &Path, rev: Revision) {
        self.breeder_html = Some(breeder_html.to_path_buf());
        self.rev = Some(rev);
    }
}
