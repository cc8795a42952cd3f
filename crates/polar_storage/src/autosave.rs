//! # Autosave
//!
//! Background thread that periodically saves a world to its source.
//!
//! ```text
//! ┌────────────┐   every interval    ┌──────────────┐   save_bytes   ┌────────┐
//! │ PolarWorld │ ──── snapshot ────▶ │ WorldLoader  │ ─────────────▶ │ Source │
//! └────────────┘                     └──────────────┘                └────────┘
//! ```
//!
//! Saves snapshot the chunk map and encode without holding its lock, so game
//! threads keep updating chunks while a save runs. A failed save is logged
//! and retried on the next tick.

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use polar_format::PolarWorld;

use crate::config::StorageConfig;
use crate::error::StorageResult;
use crate::loader::WorldLoader;
use crate::source::PolarSource;

/// Autosave configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoSaveConfig {
    /// Time between saves; `None` runs no background thread.
    pub interval: Option<Duration>,
    /// Save once more on shutdown.
    pub save_on_shutdown: bool,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_secs(300)),
            save_on_shutdown: true,
        }
    }
}

impl AutoSaveConfig {
    /// Frequent saves for live servers.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            interval: Some(Duration::from_secs(60)),
            save_on_shutdown: true,
        }
    }
}

impl From<&StorageConfig> for AutoSaveConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            interval: config.autosave_interval(),
            save_on_shutdown: config.save_on_shutdown,
        }
    }
}

/// Counters for completed saves.
#[derive(Clone, Debug, Default)]
pub struct AutoSaveStats {
    /// Successful saves.
    pub saves: u64,
    /// Failed saves.
    pub failures: u64,
    /// Size of the last successful save.
    pub last_bytes: usize,
    /// Duration of the last successful save.
    pub last_duration: Duration,
}

struct SaveTarget {
    world: Arc<PolarWorld>,
    source: Arc<dyn PolarSource>,
    loader: WorldLoader,
    stats: Mutex<AutoSaveStats>,
}

impl SaveTarget {
    fn save(&self) -> StorageResult<usize> {
        let start = Instant::now();
        match self.loader.save(&self.world, self.source.as_ref()) {
            Ok(bytes) => {
                let elapsed = start.elapsed();
                let mut stats = self.stats.lock();
                stats.saves += 1;
                stats.last_bytes = bytes;
                stats.last_duration = elapsed;
                tracing::info!("Autosaved world: {} bytes in {:?}", bytes, elapsed);
                Ok(bytes)
            }
            Err(e) => {
                self.stats.lock().failures += 1;
                tracing::warn!("Autosave failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Periodically saves a shared world.
///
/// Dropping the saver stops the thread and performs the shutdown save.
pub struct AutoSaver {
    target: Arc<SaveTarget>,
    save_on_shutdown: bool,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AutoSaver {
    /// Starts saving `world` to `source`.
    pub fn start(
        world: Arc<PolarWorld>,
        source: Arc<dyn PolarSource>,
        loader: WorldLoader,
        config: &AutoSaveConfig,
    ) -> Self {
        let target = Arc::new(SaveTarget {
            world,
            source,
            loader,
            stats: Mutex::new(AutoSaveStats::default()),
        });

        let (stop, handle) = match config.interval {
            Some(interval) => {
                let (tx, rx) = bounded::<()>(1);
                let worker = Arc::clone(&target);
                let handle = thread::spawn(move || loop {
                    match rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let _ = worker.save();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                });
                (Some(tx), Some(handle))
            }
            None => (None, None),
        };

        Self {
            target,
            save_on_shutdown: config.save_on_shutdown,
            stop,
            handle,
        }
    }

    /// True while the background thread runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Saves immediately on the calling thread.
    pub fn save_now(&self) -> StorageResult<usize> {
        self.target.save()
    }

    /// Snapshot of the save counters.
    #[must_use]
    pub fn stats(&self) -> AutoSaveStats {
        self.target.stats.lock().clone()
    }

    /// Stops the thread and performs the shutdown save if configured.
    pub fn shutdown(mut self) -> StorageResult<()> {
        self.stop_worker();
        if std::mem::take(&mut self.save_on_shutdown) {
            self.target.save()?;
        }
        Ok(())
    }

    fn stop_worker(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Autosave thread panicked");
            }
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.stop_worker();
        if self.save_on_shutdown {
            let _ = self.target.save();
        }
    }
}

impl std::fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaver")
            .field("running", &self.is_running())
            .field("save_on_shutdown", &self.save_on_shutdown)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
