//! # World Loader
//!
//! Decodes worlds from a [`PolarSource`] and encodes them back.
//!
//! ## Deprecated Revision
//!
//! Revision 8 stored entities inline in each chunk. It is read into the
//! chunk's user data like any other blob; with `resave_deprecated` set the
//! loader immediately writes the world back in the latest revision so the
//! file stops depending on the deprecated layout.

use std::sync::Arc;

use polar_format::version::VERSION_DEPRECATED_ENTITIES;
use polar_format::{read_world_with_converter, write_world_with_converter, DataConverter, NoopConverter, PolarWorld};

use crate::config::StorageConfig;
use crate::error::StorageResult;
use crate::source::{FileSource, PolarSource};

/// Loads and saves worlds through a shared data converter.
#[derive(Clone)]
pub struct WorldLoader {
    converter: Arc<dyn DataConverter>,
    resave_deprecated: bool,
}

impl std::fmt::Debug for WorldLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldLoader")
            .field("data_version", &self.converter.current_data_version())
            .field("resave_deprecated", &self.resave_deprecated)
            .finish()
    }
}

impl Default for WorldLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldLoader {
    /// Loader with the no-op converter that resaves deprecated worlds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_converter(Arc::new(NoopConverter::default()))
    }

    /// Loader upgrading block data through `converter`.
    #[must_use]
    pub fn with_converter(converter: Arc<dyn DataConverter>) -> Self {
        Self {
            converter,
            resave_deprecated: true,
        }
    }

    /// Loader following `config`.
    #[must_use]
    pub fn from_config(config: &StorageConfig, converter: Arc<dyn DataConverter>) -> Self {
        Self::with_converter(converter).resave_deprecated(config.resave_deprecated)
    }

    /// Sets whether deprecated worlds are rewritten on load.
    #[must_use]
    pub const fn resave_deprecated(mut self, enabled: bool) -> Self {
        self.resave_deprecated = enabled;
        self
    }

    /// Converter used for reads and for the data version stamped on saves.
    #[inline]
    #[must_use]
    pub fn converter(&self) -> &dyn DataConverter {
        self.converter.as_ref()
    }

    /// Reads and decodes the world held by `source`.
    pub fn load(&self, source: &dyn PolarSource) -> StorageResult<PolarWorld> {
        let bytes = source.read_bytes()?;
        let world = read_world_with_converter(&bytes, self.converter())?;
        tracing::debug!(
            "Loaded world: {} bytes, version {}, {} chunks",
            bytes.len(),
            world.version(),
            world.chunk_count()
        );

        if self.resave_deprecated && world.version() == VERSION_DEPRECATED_ENTITIES {
            tracing::info!(
                "World uses deprecated format version {}, resaving in the latest version",
                VERSION_DEPRECATED_ENTITIES
            );
            self.save(&world, source)?;
        }
        Ok(world)
    }

    /// Loads the world at `source`, or creates one with `create` when the file
    /// does not exist yet.
    pub fn load_or_create<F>(&self, source: &FileSource, create: F) -> StorageResult<PolarWorld>
    where
        F: FnOnce() -> StorageResult<PolarWorld>,
    {
        if source.exists() {
            return self.load(source);
        }
        tracing::info!("No world at {}, creating a new one", source.path().display());
        create()
    }

    /// Encodes `world` in memory and stores it in `source`. Returns the
    /// number of bytes written.
    pub fn save(&self, world: &PolarWorld, source: &dyn PolarSource) -> StorageResult<usize> {
        let bytes = write_world_with_converter(world, self.converter())?;
        source.save_bytes(&bytes)?;
        tracing::debug!("Saved world: {} bytes, {} chunks", bytes.len(), world.chunk_count());
        Ok(bytes.len())
    }
}
