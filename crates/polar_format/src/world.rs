//! # World Store
//!
//! The in-memory world: header metadata plus a concurrent chunk map.
//!
//! ## Locking
//!
//! The chunk map sits behind one read-write lock. Lookups and snapshots
//! share it; inserts and removals take it exclusively for a single map
//! operation. Chunks are shared as `Arc<PolarChunk>` and never mutated in
//! place, so a reader holding a chunk is unaffected by later updates.
//!
//! A save takes a snapshot of the current chunk handles and serializes them
//! with no lock held. Updates that land during the save may or may not be in
//! it, per chunk.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::chunk::PolarChunk;
use crate::compression::CompressionType;
use crate::converter::NOOP_DATA_VERSION;
use crate::coords::{chunk_key, chunk_key_x, chunk_key_z};
use crate::error::{FormatError, FormatResult};
use crate::version::LATEST_VERSION;

/// Lowest section of a blank world.
pub const DEFAULT_MIN_SECTION: i8 = -4;
/// Highest section of a blank world.
pub const DEFAULT_MAX_SECTION: i8 = 19;

/// Initial chunk map capacity.
const INITIAL_CHUNK_CAPACITY: usize = 256;

/// A world and its chunks.
///
/// Safe to share between threads; see the module docs for the lock
/// discipline.
#[derive(Debug)]
pub struct PolarWorld {
    version: u16,
    data_version: i32,
    min_section: i8,
    max_section: i8,
    compression: RwLock<CompressionType>,
    user_data: RwLock<Vec<u8>>,
    chunks: RwLock<HashMap<i64, Arc<PolarChunk>>>,
    expand_chunks: RwLock<HashSet<i64>>,
}

impl PolarWorld {
    /// Creates an empty world spanning `min_section..=max_section`.
    pub fn new(min_section: i8, max_section: i8) -> FormatResult<Self> {
        Self::from_parts(
            LATEST_VERSION,
            NOOP_DATA_VERSION,
            CompressionType::default(),
            min_section,
            max_section,
            Vec::new(),
            Vec::new(),
        )
    }

    /// Creates an empty world with the default vertical extent.
    #[must_use]
    pub fn blank() -> Self {
        Self::build(
            LATEST_VERSION,
            NOOP_DATA_VERSION,
            CompressionType::default(),
            DEFAULT_MIN_SECTION,
            DEFAULT_MAX_SECTION,
            Vec::new(),
        )
    }

    /// Assembles a world from decoded parts.
    ///
    /// Fails if the section bounds are inverted or a chunk does not span
    /// them exactly.
    pub fn from_parts(
        version: u16,
        data_version: i32,
        compression: CompressionType,
        min_section: i8,
        max_section: i8,
        user_data: Vec<u8>,
        chunks: Vec<PolarChunk>,
    ) -> FormatResult<Self> {
        if min_section >= max_section {
            return Err(FormatError::InvalidSectionBounds {
                min: min_section,
                max: max_section,
            });
        }
        let world = Self::build(version, data_version, compression, min_section, max_section, user_data);
        {
            let mut map = world.chunks.write();
            for chunk in chunks {
                world.check_sections(&chunk)?;
                map.insert(chunk_key(chunk.x(), chunk.z()), Arc::new(chunk));
            }
        }
        Ok(world)
    }

    fn build(
        version: u16,
        data_version: i32,
        compression: CompressionType,
        min_section: i8,
        max_section: i8,
        user_data: Vec<u8>,
    ) -> Self {
        Self {
            version,
            data_version,
            min_section,
            max_section,
            compression: RwLock::new(compression),
            user_data: RwLock::new(user_data),
            chunks: RwLock::new(HashMap::with_capacity(INITIAL_CHUNK_CAPACITY)),
            expand_chunks: RwLock::new(HashSet::new()),
        }
    }

    /// Returns this world with a different game data version.
    #[must_use]
    pub fn with_data_version(mut self, data_version: i32) -> Self {
        self.data_version = data_version;
        self
    }

    fn check_sections(&self, chunk: &PolarChunk) -> FormatResult<()> {
        let expected = self.section_count();
        let found = chunk.sections().len();
        if found != expected {
            return Err(FormatError::SectionCountMismatch { expected, found });
        }
        Ok(())
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Format version the world was read as.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Game data version of the stored identifiers.
    #[inline]
    #[must_use]
    pub const fn data_version(&self) -> i32 {
        self.data_version
    }

    /// Lowest section index.
    #[inline]
    #[must_use]
    pub const fn min_section(&self) -> i8 {
        self.min_section
    }

    /// Highest section index.
    #[inline]
    #[must_use]
    pub const fn max_section(&self) -> i8 {
        self.max_section
    }

    /// Sections per chunk.
    #[inline]
    #[must_use]
    pub const fn section_count(&self) -> usize {
        (self.max_section as i32 - self.min_section as i32 + 1) as usize
    }

    /// Compression used when this world is written.
    #[must_use]
    pub fn compression(&self) -> CompressionType {
        *self.compression.read()
    }

    /// Changes the compression used on the next write.
    pub fn set_compression(&self, compression: CompressionType) {
        *self.compression.write() = compression;
    }

    /// Copy of the world user-data blob.
    #[must_use]
    pub fn user_data(&self) -> Vec<u8> {
        self.user_data.read().clone()
    }

    /// Replaces the world user-data blob.
    pub fn set_user_data(&self, user_data: Vec<u8>) {
        *self.user_data.write() = user_data;
    }

    // =========================================================================
    // Chunks
    // =========================================================================

    /// Chunk at `(x, z)`, if stored.
    #[must_use]
    pub fn chunk_at(&self, x: i32, z: i32) -> Option<Arc<PolarChunk>> {
        self.chunks.read().get(&chunk_key(x, z)).cloned()
    }

    /// Runs `f` against the chunk at `(x, z)` under the read lock.
    pub fn with_chunk<F, R>(&self, x: i32, z: i32, f: F) -> Option<R>
    where
        F: FnOnce(&PolarChunk) -> R,
    {
        self.chunks.read().get(&chunk_key(x, z)).map(|chunk| f(chunk.as_ref()))
    }

    /// Stores `chunk` at `(x, z)`, returning whatever it replaced.
    ///
    /// The chunk must have exactly [`Self::section_count`] sections.
    pub fn update_chunk_at(&self, x: i32, z: i32, chunk: PolarChunk) -> FormatResult<Option<Arc<PolarChunk>>> {
        chunk.validate(self.section_count())?;
        let chunk = Arc::new(chunk);
        Ok(self.chunks.write().insert(chunk_key(x, z), chunk))
    }

    /// Removes the chunk at `(x, z)`, returning it if it existed.
    pub fn remove_chunk_at(&self, x: i32, z: i32) -> Option<Arc<PolarChunk>> {
        self.chunks.write().remove(&chunk_key(x, z))
    }

    /// Snapshot of every stored chunk, ordered by `(x, z)` of its slot.
    #[must_use]
    pub fn chunks(&self) -> Vec<Arc<PolarChunk>> {
        let mut entries: Vec<_> = {
            let map = self.chunks.read();
            map.iter()
                .map(|(&key, chunk)| ((chunk_key_x(key), chunk_key_z(key)), Arc::clone(chunk)))
                .collect()
        };
        entries.sort_unstable_by_key(|&(coords, _)| coords);
        entries.into_iter().map(|(_, chunk)| chunk).collect()
    }

    /// Snapshot of every stored chunk coordinate.
    #[must_use]
    pub fn chunk_keys(&self) -> Vec<(i32, i32)> {
        self.chunks
            .read()
            .keys()
            .map(|&key| (chunk_key_x(key), chunk_key_z(key)))
            .collect()
    }

    /// Number of stored chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    /// Number of stored chunks with at least one non-empty section.
    #[must_use]
    pub fn non_empty_chunk_count(&self) -> usize {
        self.chunks.read().values().filter(|chunk| !chunk.is_empty()).count()
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Marks `(x, z)` as needing generation. Returns true if newly marked.
    pub fn add_expand_chunk(&self, x: i32, z: i32) -> bool {
        self.expand_chunks.write().insert(chunk_key(x, z))
    }

    /// Clears the mark on `(x, z)`. Returns true if it was marked.
    pub fn remove_expand_chunk(&self, x: i32, z: i32) -> bool {
        self.expand_chunks.write().remove(&chunk_key(x, z))
    }

    /// True if `(x, z)` is marked as needing generation.
    #[must_use]
    pub fn is_expand_chunk(&self, x: i32, z: i32) -> bool {
        self.expand_chunks.read().contains(&chunk_key(x, z))
    }

    /// Snapshot of every marked coordinate.
    #[must_use]
    pub fn expand_chunks(&self) -> Vec<(i32, i32)> {
        self.expand_chunks
            .read()
            .iter()
            .map(|&key| (chunk_key_x(key), chunk_key_z(key)))
            .collect()
    }
}

impl Default for PolarWorld {
    fn default() -> Self {
        Self::blank()
    }
}
