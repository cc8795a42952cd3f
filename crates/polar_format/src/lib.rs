//! # Polar World Format
//!
//! Compact, versioned storage for sparse voxel worlds.
//!
//! ## Design Principles
//!
//! 1. **Storage scales with variety** - sections store a palette of distinct
//!    blocks plus bit-packed indices, so a uniform section costs one string
//! 2. **Every revision stays readable** - the reader accepts all nine format
//!    revisions; the writer only ever emits the latest
//! 3. **No panics on input** - malformed bytes surface as [`FormatError`]
//! 4. **Pure CPU** - codec calls work on resident buffers and never do I/O
//!
//! ## Thread Safety
//!
//! [`PolarWorld`] is `Send + Sync`. Chunk lookups share a read lock, updates
//! take it exclusively for one map operation, and saves serialize a snapshot
//! without holding any lock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use polar_format::{read_world, write_world, PolarChunk, PolarSection, PolarWorld};
//!
//! let world = PolarWorld::blank();
//! let mut sections = vec![PolarSection::default(); world.section_count()];
//! sections[4] = PolarSection::uniform("minecraft:stone", "minecraft:plains");
//! world.update_chunk_at(0, 0, PolarChunk::new(0, 0, sections))?;
//!
//! let bytes = write_world(&world)?;
//! let loaded = read_world(&bytes)?;
//! assert_eq!(loaded.chunk_count(), 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bytes;
pub mod chunk;
pub mod compression;
pub mod converter;
pub mod coords;
pub mod error;
pub mod nbt;
pub mod palette;
pub mod reader;
pub mod section;
pub mod userdata;
pub mod version;
pub mod world;
pub mod writer;

pub use chunk::{decode_legacy_entities, encode_legacy_entities, BlockEntity, LegacyEntity, PolarChunk};
pub use compression::CompressionType;
pub use converter::{DataConverter, NoopConverter};
pub use coords::{block_index, block_position, chunk_key, chunk_key_x, chunk_key_z};
pub use error::{CodecError, CodecResult, FormatError, FormatResult};
pub use nbt::{NbtCompound, NbtList, NbtTag};
pub use reader::{read_world, read_world_with_converter};
pub use section::{Light, LightContent, PolarSection};
pub use userdata::{read_schematic_offset, write_schematic_offset};
pub use version::{FormatFeatures, LATEST_VERSION, MAGIC};
pub use world::PolarWorld;
pub use writer::{write_world, write_world_with_converter};
