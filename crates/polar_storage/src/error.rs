//! # Storage Error Types
//!
//! Failures while moving encoded worlds between memory and their sources.

use std::path::PathBuf;
use thiserror::Error;

use polar_format::CodecError;

/// Errors that can occur while loading, saving or configuring storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The world bytes could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A file operation failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::StorageConfig`].
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured world bounds are unusable.
    #[error("invalid world bounds: min section {min} must be below max section {max}")]
    InvalidBounds {
        /// Configured lowest section.
        min: i8,
        /// Configured highest section.
        max: i8,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<polar_format::FormatError> for StorageError {
    fn from(e: polar_format::FormatError) -> Self {
        Self::Codec(e.into())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
