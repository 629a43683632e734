// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! Settings are stored as JSON under the platform config directory
//! (`~/.config/scangrab/config.json` on Linux). Missing or unreadable
//! files fall back to defaults; the session options mirror what the
//! host-bridge caller may override per scan.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DETECT_MAX_DIMENSION, DEFAULT_JPEG_QUALITY,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Scan session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// JPEG quality (1-100) for the frozen frame
    pub jpeg_quality: u8,
    /// Prefer the back-facing camera when the embedding layer binds a device
    pub facing_back: bool,
    /// Long-edge size frames are decimated to before detection
    pub max_detect_dimension: u32,
    /// Complete the session on detections whose decoded text is empty
    pub accept_empty_text: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            facing_back: true,
            max_detect_dimension: DEFAULT_DETECT_MAX_DIMENSION,
            accept_empty_text: false,
        }
    }
}

impl ScanConfig {
    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            debug!("no config directory available, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist configuration to disk
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::other("no config directory available"));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(&path, contents)?;

        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Path of the settings file, if a config directory exists
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.jpeg_quality, 80);
        assert!(config.facing_back);
        assert_eq!(config.max_detect_dimension, 640);
        assert!(!config.accept_empty_text);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ScanConfig {
            jpeg_quality: 95,
            facing_back: false,
            max_detect_dimension: 1280,
            accept_empty_text: true,
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(serde_json::from_str::<ScanConfig>("{\"jpeg_quality\": \"high\"}").is_err());
    }
}
