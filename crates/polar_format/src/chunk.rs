//! # Chunks
//!
//! A vertical column of sections plus its block entities, heightmaps and an
//! opaque user-data blob.
//!
//! ## Record Layout
//!
//! ```text
//! varint x, varint z
//! section × sectionCount
//! varint count, block entity × count
//! [legacy entities]              (version 8 only)
//! i32 heightmap mask, long array per set bit
//! byte array user data           (version 3+)
//! ```
//!
//! Version 8 files carry an inline entity list before the heightmaps. It is
//! folded into the user-data blob on read (see [`encode_legacy_entities`])
//! and never written.

use crate::bytes::{ByteReader, ByteWriter};
use crate::coords::{block_index, block_position};
use crate::error::{FormatError, FormatResult};
use crate::nbt::{self, NbtCompound};
use crate::palette::{bits_to_represent, pack, packed_len, unpack};
use crate::reader::DecodeContext;
use crate::section::{read_section, write_section, PolarSection};

/// Heightmap slots per chunk.
pub const MAX_HEIGHTMAPS: usize = 32;
/// Columns in a chunk heightmap (16 × 16).
pub const HEIGHTMAP_SIZE: usize = 16 * 16;
/// Blocks per section edge.
pub const SECTION_SIZE: usize = 16;
/// Marker byte leading a migrated entity blob.
pub const LEGACY_ENTITY_MARKER: u8 = 1;

/// A block with attached tag data, such as a chest or sign.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntity {
    index: i32,
    id: Option<String>,
    data: Option<NbtCompound>,
}

impl BlockEntity {
    /// Creates a block entity at a chunk-local position.
    #[must_use]
    pub fn new(x: i32, y: i32, z: i32, id: Option<String>, data: Option<NbtCompound>) -> Self {
        Self::from_index(block_index(x, y, z), id, data)
    }

    /// Creates a block entity from a packed position index.
    #[must_use]
    pub const fn from_index(index: i32, id: Option<String>, data: Option<NbtCompound>) -> Self {
        Self { index, id, data }
    }

    /// Packed position index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> i32 {
        self.index
    }

    /// Chunk-local `(x, y, z)`.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> (i32, i32, i32) {
        block_position(self.index)
    }

    /// Block entity type id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Tag data.
    #[inline]
    #[must_use]
    pub const fn data(&self) -> Option<&NbtCompound> {
        self.data.as_ref()
    }
}

/// An entity record from the deprecated inline entity list.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyEntity {
    /// World x.
    pub x: f64,
    /// World y.
    pub y: f64,
    /// World z.
    pub z: f64,
    /// Yaw in degrees.
    pub yaw: f32,
    /// Pitch in degrees.
    pub pitch: f32,
    /// Serialized entity, opaque here.
    pub bytes: Vec<u8>,
}

impl LegacyEntity {
    fn read(reader: &mut ByteReader<'_>) -> FormatResult<Self> {
        Ok(Self {
            x: reader.read_f64()?,
            y: reader.read_f64()?,
            z: reader.read_f64()?,
            yaw: reader.read_f32()?,
            pitch: reader.read_f32()?,
            bytes: reader.read_byte_array()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.z);
        writer.write_f32(self.yaw);
        writer.write_f32(self.pitch);
        writer.write_byte_array(&self.bytes);
    }
}

fn read_entity_list(reader: &mut ByteReader<'_>) -> FormatResult<Vec<LegacyEntity>> {
    let count = reader.read_length()?;
    let mut entities = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        entities.push(LegacyEntity::read(reader)?);
    }
    Ok(entities)
}

/// Builds the user-data blob that replaces a version 8 entity list.
#[must_use]
pub fn encode_legacy_entities(entities: &[LegacyEntity]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.write_u8(LEGACY_ENTITY_MARKER);
    writer.write_length(entities.len());
    for entity in entities {
        entity.write(&mut writer);
    }
    writer.into_inner()
}

/// Reads entities back out of a blob built by [`encode_legacy_entities`].
///
/// An empty blob holds no entities.
pub fn decode_legacy_entities(blob: &[u8]) -> FormatResult<Vec<LegacyEntity>> {
    if blob.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = ByteReader::new(blob);
    if reader.read_u8()? != LEGACY_ENTITY_MARKER {
        return Err(FormatError::MalformedUserData("unknown entity blob marker"));
    }
    read_entity_list(&mut reader)
}

/// One column of sections.
///
/// Chunks are immutable once built; a world replaces them whole.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarChunk {
    x: i32,
    z: i32,
    sections: Vec<PolarSection>,
    block_entities: Vec<BlockEntity>,
    heightmaps: [Option<Vec<u32>>; MAX_HEIGHTMAPS],
    user_data: Vec<u8>,
}

impl PolarChunk {
    /// Creates a chunk from its sections, bottom first.
    #[must_use]
    pub fn new(x: i32, z: i32, sections: Vec<PolarSection>) -> Self {
        Self {
            x,
            z,
            sections,
            block_entities: Vec::new(),
            heightmaps: std::array::from_fn(|_| None),
            user_data: Vec::new(),
        }
    }

    /// Creates a chunk of `section_count` empty sections.
    #[must_use]
    pub fn blank(x: i32, z: i32, section_count: usize) -> Self {
        Self::new(x, z, vec![PolarSection::default(); section_count])
    }

    /// Replaces the block entity list.
    #[must_use]
    pub fn with_block_entities(mut self, block_entities: Vec<BlockEntity>) -> Self {
        self.block_entities = block_entities;
        self
    }

    /// Sets one heightmap slot.
    ///
    /// A heightmap holds either 256 column heights or nothing at all.
    pub fn with_heightmap(mut self, slot: usize, heights: Vec<u32>) -> FormatResult<Self> {
        if slot >= MAX_HEIGHTMAPS {
            return Err(FormatError::MalformedSection("heightmap slot out of range"));
        }
        if !heights.is_empty() && heights.len() != HEIGHTMAP_SIZE {
            return Err(FormatError::MalformedSection("heightmap must hold 256 entries"));
        }
        self.heightmaps[slot] = Some(heights);
        Ok(self)
    }

    /// Replaces the user-data blob.
    #[must_use]
    pub fn with_user_data(mut self, user_data: Vec<u8>) -> Self {
        self.user_data = user_data;
        self
    }

    /// Chunk x.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Chunk z.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Sections, index 0 at the world's lowest section.
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[PolarSection] {
        &self.sections
    }

    /// Block entities in stored order.
    #[inline]
    #[must_use]
    pub fn block_entities(&self) -> &[BlockEntity] {
        &self.block_entities
    }

    /// Heightmap in `slot`, if present.
    #[must_use]
    pub fn heightmap(&self, slot: usize) -> Option<&[u32]> {
        self.heightmaps.get(slot)?.as_deref()
    }

    /// Opaque user data.
    #[inline]
    #[must_use]
    pub fn user_data(&self) -> &[u8] {
        &self.user_data
    }

    /// True if every section is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(PolarSection::is_empty)
    }

    /// Checks that this chunk fits a world `section_count` sections tall.
    ///
    /// Every heightmap entry must fit in [`heightmap_bits`] for that height.
    pub fn validate(&self, section_count: usize) -> FormatResult<()> {
        if self.sections.len() != section_count {
            return Err(FormatError::SectionCountMismatch {
                expected: section_count,
                found: self.sections.len(),
            });
        }
        let bits = heightmap_bits(section_count);
        for heights in self.heightmaps.iter().flatten() {
            if let Some(&height) = heights.iter().find(|&&h| u64::from(h) >> bits != 0) {
                return Err(FormatError::HeightOutOfRange { height, bits });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Writes one chunk record at the latest version.
///
/// Fails without writing anything if the chunk does not pass
/// [`PolarChunk::validate`].
pub fn write_chunk(writer: &mut ByteWriter, chunk: &PolarChunk, section_count: usize) -> FormatResult<()> {
    chunk.validate(section_count)?;

    writer.write_var_int(chunk.x);
    writer.write_var_int(chunk.z);

    for section in &chunk.sections {
        write_section(writer, section);
    }

    writer.write_length(chunk.block_entities.len());
    for block_entity in &chunk.block_entities {
        write_block_entity(writer, block_entity)?;
    }

    let mut mask = 0u32;
    for (slot, heightmap) in chunk.heightmaps.iter().enumerate() {
        if heightmap.is_some() {
            mask |= 1 << slot;
        }
    }
    writer.write_i32(mask as i32);

    let bits = heightmap_bits(section_count);
    for heights in chunk.heightmaps.iter().flatten() {
        if heights.is_empty() {
            writer.write_long_array(&[]);
        } else {
            writer.write_long_array(&pack(heights, bits));
        }
    }

    writer.write_byte_array(&chunk.user_data);
    Ok(())
}

fn write_block_entity(writer: &mut ByteWriter, block_entity: &BlockEntity) -> FormatResult<()> {
    writer.write_i32(block_entity.index);
    writer.write_optional_string(block_entity.id.as_deref());
    writer.write_bool(block_entity.data.is_some());
    if let Some(data) = &block_entity.data {
        nbt::write_root(writer, data)?;
    }
    Ok(())
}

/// Bits per heightmap entry for a world `section_count` sections tall.
#[must_use]
pub fn heightmap_bits(section_count: usize) -> u32 {
    bits_to_represent((section_count * SECTION_SIZE) as u32).max(1)
}

/// Reads one chunk record.
pub fn read_chunk(
    reader: &mut ByteReader<'_>,
    ctx: &DecodeContext<'_>,
    section_count: usize,
) -> FormatResult<PolarChunk> {
    let x = reader.read_var_int()?;
    let z = reader.read_var_int()?;

    let mut sections = Vec::with_capacity(section_count);
    for _ in 0..section_count {
        sections.push(read_section(reader, ctx)?);
    }

    let block_entity_count = reader.read_length()?;
    let mut block_entities = Vec::with_capacity(block_entity_count.min(reader.remaining()));
    for _ in 0..block_entity_count {
        block_entities.push(read_block_entity(reader, ctx)?);
    }

    let legacy_entities = if ctx.features.inline_entities {
        Some(read_entity_list(reader)?)
    } else {
        None
    };

    let mut heightmaps: [Option<Vec<u32>>; MAX_HEIGHTMAPS] = std::array::from_fn(|_| None);
    let mask = reader.read_i32()? as u32;
    let expected_bits = heightmap_bits(section_count);
    for (slot, heightmap) in heightmaps.iter_mut().enumerate() {
        if mask & (1 << slot) == 0 {
            continue;
        }
        let packed = reader.read_long_array()?;
        *heightmap = Some(unpack_heightmap(&packed, expected_bits)?);
    }

    let mut user_data = if ctx.features.chunk_user_data {
        reader.read_byte_array()?
    } else {
        Vec::new()
    };
    if let Some(entities) = legacy_entities {
        user_data = encode_legacy_entities(&entities);
    }

    Ok(PolarChunk {
        x,
        z,
        sections,
        block_entities,
        heightmaps,
        user_data,
    })
}

fn unpack_heightmap(packed: &[u64], expected_bits: u32) -> FormatResult<Vec<u32>> {
    if packed.is_empty() {
        return Ok(Vec::new());
    }
    // Older writers sized heightmaps differently; infer the width from the
    // word count when it does not match this world's height.
    let bits = if packed.len() == packed_len(HEIGHTMAP_SIZE, expected_bits) {
        expected_bits
    } else {
        (packed.len() * 64 / HEIGHTMAP_SIZE) as u32
    };
    if !(1..=32).contains(&bits) {
        return Err(FormatError::MalformedSection("heightmap width out of range"));
    }
    Ok(unpack(packed, bits, HEIGHTMAP_SIZE))
}

fn read_block_entity(reader: &mut ByteReader<'_>, ctx: &DecodeContext<'_>) -> FormatResult<BlockEntity> {
    let index = reader.read_i32()?;
    let mut id = reader.read_optional_string()?;

    let has_data = !ctx.features.optional_block_entity_data || reader.read_bool()?;
    let mut data = if has_data {
        Some(nbt::read_root(reader, ctx.features.named_tag_root)?)
    } else {
        None
    };

    if ctx.needs_conversion() {
        let (new_id, new_data) = ctx.converter.convert_block_entity(
            id.unwrap_or_default(),
            data.unwrap_or_else(NbtCompound::new),
            ctx.data_version,
            ctx.target_data_version(),
        );
        id = (!new_id.is_empty()).then_some(new_id);
        data = (!new_data.is_empty()).then_some(new_data);
    }

    Ok(BlockEntity { index, id, data })
}
