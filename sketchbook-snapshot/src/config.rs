//! Snapshot configuration, read from `sketchbook.toml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sketchbook_core::RenderOptions;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::browser::{is_valid_timestamp_format, DEFAULT_TIMESTAMP_FORMAT};
use crate::storage::{FileStore, StorageError};
use crate::STORAGE_KEY;

/// File name looked up in the platform config dir.
pub const CONFIG_FILE_NAME: &str = "sketchbook.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    NoConfigDir,

    #[error("invalid config: {reason}")]
    Invalid { reason: String },

    #[error("failed to load config: {0:#}")]
    Load(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Storage key holding the snapshot list.
    pub storage_key: String,
    /// Overrides the platform data dir for the file-backed store.
    pub storage_dir: Option<PathBuf>,
    /// strftime layout for card timestamps.
    pub timestamp_format: String,
    /// Preview scale. Defaults to 1x.
    pub render_scale: f32,
    /// Opaque preview background. Defaults to on.
    pub render_background: bool,
    /// How long a toast stays on screen.
    pub toast_seconds: f32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            storage_dir: None,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            render_scale: 1.0,
            render_background: true,
            toast_seconds: 5.0,
        }
    }
}

impl SnapshotConfig {
    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).context("parse config toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Load from the platform config dir, or defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "storage_key must not be empty".into(),
            });
        }

        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(ConfigError::Invalid {
                reason: format!("render_scale {} must be positive", self.render_scale),
            });
        }

        if !(self.toast_seconds.is_finite() && self.toast_seconds > 0.0) {
            return Err(ConfigError::Invalid {
                reason: format!("toast_seconds {} must be positive", self.toast_seconds),
            });
        }

        if !is_valid_timestamp_format(&self.timestamp_format) {
            return Err(ConfigError::Invalid {
                reason: format!("timestamp_format {:?} is not a valid strftime layout", self.timestamp_format),
            });
        }

        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            scale: self.render_scale,
            background: self.render_background,
        }
    }

    /// Open the file-backed store this config points at.
    pub fn open_file_store(&self) -> Result<FileStore, StorageError> {
        match &self.storage_dir {
            Some(dir) => FileStore::open(dir),
            None => FileStore::open_default(),
        }
    }
}

/// Full path of the config file (~/.config/sketchbook/sketchbook.toml or platform equivalent).
pub fn config_path() -> Result<PathBuf, ConfigError> {
    directories::ProjectDirs::from("", "", "sketchbook")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}
