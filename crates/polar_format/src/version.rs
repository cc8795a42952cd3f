//! # Format Versions
//!
//! Every revision of the container that has ever been written, and the
//! optional fields each one carries.
//!
//! ## Revisions
//!
//! | Version | Change                                                    |
//! |---------|-----------------------------------------------------------|
//! | 1       | one light flag shared by block and sky light              |
//! | 2       | per-chunk user data, optional block-entity tag data      |
//! | 3       | block-entity tags switch to nameless roots (from 4)       |
//! | 4       | world user data (from 5)                                  |
//! | 5       | `grass` renamed to `short_grass` (from 6)                 |
//! | 6       | data version in the header                                |
//! | 7       | light content tag per channel (latest)                    |
//! | 8       | inline entity list per chunk (deprecated, read only)      |
//!
//! Rather than scattering version comparisons through the codec, the reader
//! resolves a [`FormatFeatures`] once from the header and consults it.

use crate::error::{FormatError, FormatResult};

/// Signature at the start of every world, ASCII `Polr`.
pub const MAGIC: u32 = 0x506F_6C72;

/// Light stored as a single flag covering both channels.
pub const VERSION_UNIFIED_LIGHT: u16 = 1;
/// Chunk user data added; block-entity tag data became optional.
pub const VERSION_USERDATA_OPT_BLOCK_ENT_NBT: u16 = 2;
/// Last revision with named tag roots.
pub const VERSION_MINESTOM_NBT_READ_BREAK: u16 = 3;
/// Last revision without world user data.
pub const VERSION_WORLD_USERDATA: u16 = 4;
/// Last revision with the old `grass` identifier.
pub const VERSION_SHORT_GRASS: u16 = 5;
/// Header carries a data version.
pub const VERSION_DATA_CONVERTER: u16 = 6;
/// Light content tags per channel.
pub const VERSION_IMPROVED_LIGHT: u16 = 7;
/// Chunks carry an inline entity list. Accepted on read, never written.
pub const VERSION_DEPRECATED_ENTITIES: u16 = 8;

/// Version every writer emits.
pub const LATEST_VERSION: u16 = VERSION_IMPROVED_LIGHT;

/// How a revision encodes section light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightEncoding {
    /// One flag byte; when set, block light then sky light data follow.
    Unified,
    /// One flag byte per channel.
    Flags,
    /// One content tag byte per channel.
    ContentTag,
}

/// Optional fields present in a given revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatFeatures {
    /// The revision these features describe.
    pub version: u16,
    /// Section light layout.
    pub light: LightEncoding,
    /// Header carries a data version varint.
    pub data_version: bool,
    /// Payload carries a world user-data blob.
    pub world_user_data: bool,
    /// Chunks end with a user-data blob.
    pub chunk_user_data: bool,
    /// Block-entity tag data is preceded by a presence byte.
    pub optional_block_entity_data: bool,
    /// Block-entity tag roots carry a name.
    pub named_tag_root: bool,
    /// `grass` must be renamed to `short_grass`.
    pub short_grass_rename: bool,
    /// Chunks carry an inline entity list before the heightmaps.
    pub inline_entities: bool,
}

impl FormatFeatures {
    /// Resolves the features of `version`, rejecting unknown revisions.
    pub const fn for_version(version: u16) -> FormatResult<Self> {
        if version > LATEST_VERSION && version != VERSION_DEPRECATED_ENTITIES {
            return Err(FormatError::UnsupportedVersion {
                found: version,
                latest: LATEST_VERSION,
            });
        }

        let light = if version <= VERSION_UNIFIED_LIGHT {
            LightEncoding::Unified
        } else if version < VERSION_IMPROVED_LIGHT {
            LightEncoding::Flags
        } else {
            LightEncoding::ContentTag
        };

        Ok(Self {
            version,
            light,
            data_version: version >= VERSION_DATA_CONVERTER,
            world_user_data: version > VERSION_WORLD_USERDATA,
            chunk_user_data: version > VERSION_USERDATA_OPT_BLOCK_ENT_NBT,
            optional_block_entity_data: version > VERSION_USERDATA_OPT_BLOCK_ENT_NBT,
            named_tag_root: version <= VERSION_MINESTOM_NBT_READ_BREAK,
            short_grass_rename: version <= VERSION_SHORT_GRASS,
            inline_entities: version == VERSION_DEPRECATED_ENTITIES,
        })
    }

    /// Features of the revision every writer emits.
    #[must_use]
    pub const fn latest() -> Self {
        Self {
            version: LATEST_VERSION,
            light: LightEncoding::ContentTag,
            data_version: true,
            world_user_data: true,
            chunk_user_data: true,
            optional_block_entity_data: true,
            named_tag_root: false,
            short_grass_rename: false,
            inline_entities: false,
        }
    }
}
