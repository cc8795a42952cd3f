//! # Data Version Conversion
//!
//! Block and block-entity identifiers change between game releases. A world
//! records the game data version it was written against; when that is older
//! than what the host runs, the reader hands each palette and block entity to
//! a [`DataConverter`] before storing it.
//!
//! The conversion tables themselves live with the host. This crate only
//! defines the seam and an identity implementation.

use crate::nbt::NbtCompound;

/// Data version reported by [`NoopConverter`].
pub const NOOP_DATA_VERSION: i32 = 3700;

/// Rewrites identifiers from one game data version to another.
///
/// All conversion hooks default to the identity transform.
pub trait DataConverter: Send + Sync {
    /// Data version assumed for worlds whose header predates the field.
    fn default_data_version(&self) -> i32;

    /// Data version the host runs; conversion targets this.
    fn current_data_version(&self) -> i32;

    /// Rewrites a section's block palette in place.
    ///
    /// Entries map one to one; the packed indices that follow are decoded
    /// against the stored palette length.
    fn convert_block_palette(&self, palette: &mut [String], from_version: i32, to_version: i32) {
        let _ = (palette, from_version, to_version);
    }

    /// Rewrites a block entity's type id and tag data.
    ///
    /// A missing id arrives as an empty string and missing data as an empty
    /// compound; returning either empty clears it on the block entity.
    fn convert_block_entity(
        &self,
        id: String,
        data: NbtCompound,
        from_version: i32,
        to_version: i32,
    ) -> (String, NbtCompound) {
        let _ = (from_version, to_version);
        (id, data)
    }
}

/// Converter that changes nothing and reports one fixed data version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoopConverter {
    data_version: i32,
}

impl NoopConverter {
    /// Creates a converter reporting `data_version` as both default and current.
    #[must_use]
    pub const fn new(data_version: i32) -> Self {
        Self { data_version }
    }
}

impl Default for NoopConverter {
    fn default() -> Self {
        Self::new(NOOP_DATA_VERSION)
    }
}

impl DataConverter for NoopConverter {
    fn default_data_version(&self) -> i32 {
        self.data_version
    }

    fn current_data_version(&self) -> i32 {
        self.data_version
    }
}
