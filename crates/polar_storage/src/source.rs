//! # World Sources
//!
//! Where encoded worlds are read from and saved to.
//!
//! A source moves whole files only: the loader encodes a world completely in
//! memory and hands the bytes over in one call.

use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{StorageError, StorageResult};

/// File extension of stored worlds.
pub const WORLD_EXTENSION: &str = "polar";

/// Distinguishes temporary files of saves running at the same time.
static SAVE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Backing store for one encoded world.
pub trait PolarSource: Send + Sync {
    /// Reads the complete encoded world.
    fn read_bytes(&self) -> StorageResult<Vec<u8>>;

    /// Replaces the stored world with `bytes`.
    fn save_bytes(&self, bytes: &[u8]) -> StorageResult<()>;
}

/// In-memory source.
#[derive(Debug, Default)]
pub struct BytesSource {
    bytes: Mutex<Vec<u8>>,
}

impl BytesSource {
    /// Creates a source holding `bytes`.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(bytes),
        }
    }

    /// Copy of the stored bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }
}

impl PolarSource for BytesSource {
    fn read_bytes(&self) -> StorageResult<Vec<u8>> {
        Ok(self.bytes())
    }

    fn save_bytes(&self, bytes: &[u8]) -> StorageResult<()> {
        *self.bytes.lock() = bytes.to_vec();
        Ok(())
    }
}

/// File-backed source.
///
/// Saves go to a sibling temporary file that is renamed over the target, so
/// an interrupted save leaves the previous file intact. Each save gets its
/// own temporary file; concurrent saves race only on the final rename and
/// the last one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source for world `name` inside `dir`, i.e. `<dir>/<name>.polar`.
    #[must_use]
    pub fn in_folder(dir: impl AsRef<Path>, name: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{name}.{WORLD_EXTENSION}")))
    }

    /// Path of the world file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the world file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// `<file>.<pid>.<sequence>.tmp` next to the world file.
    fn temp_path(&self, sequence: u64) -> PathBuf {
        let mut name = self.path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
        name.push(format!(".{}.{sequence}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl PolarSource for FileSource {
    fn read_bytes(&self) -> StorageResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| StorageError::io(&self.path, e))
    }

    fn save_bytes(&self, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let temp = self.temp_path(SAVE_SEQUENCE.fetch_add(1, Ordering::Relaxed));
        if let Err(e) = fs::write(&temp, bytes) {
            let _ = fs::remove_file(&temp);
            return Err(StorageError::io(&temp, e));
        }
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            StorageError::io(&self.path, e)
        })
    }
}
