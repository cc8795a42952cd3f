//! # Storage Configuration
//!
//! Loaded once at startup from TOML. Every field is optional; missing fields
//! take the values of [`StorageConfig::default`].
//!
//! ```toml
//! worlds_dir = "worlds"
//! compression = "zstd"
//! min_section = -4
//! max_section = 19
//! autosave_interval_secs = 300
//! save_on_shutdown = true
//! resave_deprecated = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use polar_format::world::{DEFAULT_MAX_SECTION, DEFAULT_MIN_SECTION};
use polar_format::{CompressionType, PolarWorld};

use crate::error::{StorageError, StorageResult};
use crate::source::FileSource;

/// Compression named in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionSetting {
    /// Store payloads as-is.
    None,
    /// Zstandard.
    #[default]
    Zstd,
}

impl From<CompressionSetting> for CompressionType {
    fn from(setting: CompressionSetting) -> Self {
        match setting {
            CompressionSetting::None => Self::None,
            CompressionSetting::Zstd => Self::Zstd,
        }
    }
}

/// Where worlds live and how they are kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `<name>.polar` files.
    pub worlds_dir: PathBuf,
    /// Compression for newly created worlds.
    pub compression: CompressionSetting,
    /// Lowest section of newly created worlds.
    pub min_section: i8,
    /// Highest section of newly created worlds.
    pub max_section: i8,
    /// Seconds between autosaves; 0 disables autosaving.
    pub autosave_interval_secs: u64,
    /// Save once more when the autosaver shuts down.
    pub save_on_shutdown: bool,
    /// Rewrite worlds stored in the deprecated entity revision on load.
    pub resave_deprecated: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            worlds_dir: PathBuf::from("worlds"),
            compression: CompressionSetting::Zstd,
            min_section: DEFAULT_MIN_SECTION,
            max_section: DEFAULT_MAX_SECTION,
            autosave_interval_secs: 300,
            save_on_shutdown: true,
            resave_deprecated: true,
        }
    }
}

impl StorageConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> StorageResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| StorageError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Rejects bounds no world could have.
    pub fn validate(&self) -> StorageResult<()> {
        if self.min_section >= self.max_section {
            return Err(StorageError::InvalidBounds {
                min: self.min_section,
                max: self.max_section,
            });
        }
        Ok(())
    }

    /// Autosave period, or `None` when autosaving is disabled.
    #[must_use]
    pub const fn autosave_interval(&self) -> Option<Duration> {
        if self.autosave_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.autosave_interval_secs))
        }
    }

    /// File source for world `name` in [`Self::worlds_dir`].
    #[must_use]
    pub fn source_for(&self, name: &str) -> FileSource {
        FileSource::in_folder(&self.worlds_dir, name)
    }

    /// Creates an empty world with the configured bounds and compression.
    pub fn new_world(&self) -> StorageResult<PolarWorld> {
        let world = PolarWorld::new(self.min_section, self.max_section)?;
        world.set_compression(self.compression.into());
        Ok(world)
    }
}
