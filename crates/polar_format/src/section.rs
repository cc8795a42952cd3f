//! # Chunk Sections
//!
//! One 16x16x16 cube of a chunk: a block palette with per-block indices, a
//! biome palette with indices on a 4x4x4 grid, and optional light data.
//!
//! ## Record Layout
//!
//! ```text
//! u8            empty flag (1 = empty, nothing follows)
//! string array  block palette (<= 4096)
//! long array    packed block indices      (only if palette > 1)
//! string array  biome palette (<= 512)
//! long array    packed biome indices      (only if palette > 1)
//! light         block light, then sky light
//! ```
//!
//! Light has had three encodings over the life of the format; see
//! [`LightEncoding`].

use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{FormatError, FormatResult};
use crate::palette::{bits_per_entry, pack, packed_len, unpack};
use crate::reader::DecodeContext;
use crate::version::LightEncoding;

/// Blocks in a section (16³).
pub const BLOCK_CAPACITY: usize = 16 * 16 * 16;
/// Biome samples in a section (4³).
pub const BIOME_CAPACITY: usize = 4 * 4 * 4;
/// Bytes of light data per channel, one nibble per block.
pub const LIGHT_LEN: usize = BLOCK_CAPACITY / 2;
/// Largest block palette accepted on read.
pub const MAX_BLOCK_PALETTE: usize = 16 * 16 * 16;
/// Largest biome palette accepted on read.
pub const MAX_BIOME_PALETTE: usize = 8 * 8 * 8;

/// Block of an empty section.
pub const AIR: &str = "minecraft:air";
/// Biome of an empty section.
pub const PLAINS: &str = "minecraft:plains";

/// What a light channel holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LightContent {
    /// Not stored; the host recomputes it.
    Missing = 0,
    /// Stored as all zeros.
    Empty = 1,
    /// Stored as all fifteens.
    Full = 2,
    /// Stored as 2048 bytes of nibbles.
    Present = 3,
}

impl LightContent {
    /// Maps a content tag byte to a light content.
    pub const fn from_byte(byte: u8) -> FormatResult<Self> {
        match byte {
            0 => Ok(Self::Missing),
            1 => Ok(Self::Empty),
            2 => Ok(Self::Full),
            3 => Ok(Self::Present),
            other => Err(FormatError::BadLightContent(other)),
        }
    }
}

/// One light channel of a section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Light {
    /// Not stored.
    #[default]
    Missing,
    /// All zeros.
    Empty,
    /// All fifteens.
    Full,
    /// Explicit nibble data.
    Present(Box<[u8; LIGHT_LEN]>),
}

impl Light {
    /// Explicit light data.
    #[must_use]
    pub fn present(data: [u8; LIGHT_LEN]) -> Self {
        Self::Present(Box::new(data))
    }

    /// The content tag for this channel.
    #[must_use]
    pub const fn content(&self) -> LightContent {
        match self {
            Self::Missing => LightContent::Missing,
            Self::Empty => LightContent::Empty,
            Self::Full => LightContent::Full,
            Self::Present(_) => LightContent::Present,
        }
    }

    /// Light data, if stored explicitly.
    #[must_use]
    pub fn data(&self) -> Option<&[u8; LIGHT_LEN]> {
        match self {
            Self::Present(data) => Some(data),
            _ => None,
        }
    }
}

/// One 16³ cube of blocks and biomes.
///
/// Index arrays are present exactly when their palette has more than one
/// entry. Blocks are indexed `y << 8 | z << 4 | x`, biomes `y << 4 | z << 2 | x`
/// on the 4³ grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolarSection {
    block_palette: Vec<String>,
    block_data: Option<Vec<u32>>,
    biome_palette: Vec<String>,
    biome_data: Option<Vec<u32>>,
    block_light: Light,
    sky_light: Light,
}

impl Default for PolarSection {
    fn default() -> Self {
        Self::uniform(AIR, PLAINS)
    }
}

impl PolarSection {
    /// A section filled with one block and one biome, no light.
    #[must_use]
    pub fn uniform(block: &str, biome: &str) -> Self {
        Self {
            block_palette: vec![block.to_owned()],
            block_data: None,
            biome_palette: vec![biome.to_owned()],
            biome_data: None,
            block_light: Light::Missing,
            sky_light: Light::Missing,
        }
    }

    /// Builds a section from palettes and index arrays.
    ///
    /// Index arrays are dropped for single-entry palettes and required, at
    /// full capacity, for larger ones.
    pub fn new(
        block_palette: Vec<String>,
        block_data: Option<Vec<u32>>,
        biome_palette: Vec<String>,
        biome_data: Option<Vec<u32>>,
    ) -> FormatResult<Self> {
        let block_data = check_palette(&block_palette, block_data, MAX_BLOCK_PALETTE, BLOCK_CAPACITY)?;
        let biome_data = check_palette(&biome_palette, biome_data, MAX_BIOME_PALETTE, BIOME_CAPACITY)?;
        Ok(Self {
            block_palette,
            block_data,
            biome_palette,
            biome_data,
            block_light: Light::Missing,
            sky_light: Light::Missing,
        })
    }

    /// Replaces the block light channel.
    #[must_use]
    pub fn with_block_light(mut self, light: Light) -> Self {
        self.block_light = light;
        self
    }

    /// Replaces the sky light channel.
    #[must_use]
    pub fn with_sky_light(mut self, light: Light) -> Self {
        self.sky_light = light;
        self
    }

    /// Distinct block states, in index order.
    #[inline]
    #[must_use]
    pub fn block_palette(&self) -> &[String] {
        &self.block_palette
    }

    /// Per-block palette indices, absent for single-block sections.
    #[inline]
    #[must_use]
    pub fn block_data(&self) -> Option<&[u32]> {
        self.block_data.as_deref()
    }

    /// Distinct biomes, in index order.
    #[inline]
    #[must_use]
    pub fn biome_palette(&self) -> &[String] {
        &self.biome_palette
    }

    /// Per-sample biome indices, absent for single-biome sections.
    #[inline]
    #[must_use]
    pub fn biome_data(&self) -> Option<&[u32]> {
        self.biome_data.as_deref()
    }

    /// Block light channel.
    #[inline]
    #[must_use]
    pub const fn block_light(&self) -> &Light {
        &self.block_light
    }

    /// Sky light channel.
    #[inline]
    #[must_use]
    pub const fn sky_light(&self) -> &Light {
        &self.sky_light
    }

    /// Block state at a section-local position.
    ///
    /// `None` if the stored index points outside the palette.
    #[must_use]
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Option<&str> {
        let index = match &self.block_data {
            Some(data) => data[(y & 15) << 8 | (z & 15) << 4 | (x & 15)] as usize,
            None => 0,
        };
        self.block_palette.get(index).map(String::as_str)
    }

    /// Biome at a position on the section's 4³ biome grid.
    #[must_use]
    pub fn biome_at(&self, x: usize, y: usize, z: usize) -> Option<&str> {
        let index = match &self.biome_data {
            Some(data) => data[(y & 3) << 4 | (z & 3) << 2 | (x & 3)] as usize,
            None => 0,
        };
        self.biome_palette.get(index).map(String::as_str)
    }

    /// True if the section holds nothing worth storing: only
    /// `minecraft:air`, the default biome, and no light.
    ///
    /// Identifiers are compared exactly; a bare `air` is a distinct block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.block_palette.as_slice(), [block] if block == AIR)
            && matches!(self.biome_palette.as_slice(), [biome] if biome == PLAINS)
            && self.block_light == Light::Missing
            && self.sky_light == Light::Missing
    }
}

fn check_palette(
    palette: &[String],
    data: Option<Vec<u32>>,
    max: usize,
    capacity: usize,
) -> FormatResult<Option<Vec<u32>>> {
    if palette.is_empty() {
        return Err(FormatError::MalformedSection("empty palette"));
    }
    if palette.len() > max {
        return Err(FormatError::PaletteOverflow {
            len: palette.len(),
            max,
        });
    }
    if palette.len() == 1 {
        return Ok(None);
    }
    let data = match data {
        Some(data) if data.len() == capacity => data,
        Some(_) => return Err(FormatError::MalformedSection("index array has wrong length")),
        None => return Err(FormatError::MalformedSection("missing index array")),
    };
    if let Some(&index) = data.iter().find(|&&index| index as usize >= palette.len()) {
        return Err(FormatError::PaletteIndexOutOfRange {
            index,
            len: palette.len(),
        });
    }
    Ok(Some(data))
}

// =============================================================================
// Codec
// =============================================================================

/// Writes one section record at the latest version.
pub fn write_section(writer: &mut ByteWriter, section: &PolarSection) {
    let empty = section.is_empty();
    writer.write_bool(empty);
    if empty {
        return;
    }

    write_palette(writer, &section.block_palette, section.block_data.as_deref());
    write_palette(writer, &section.biome_palette, section.biome_data.as_deref());

    write_light(writer, &section.block_light);
    write_light(writer, &section.sky_light);
}

fn write_palette(writer: &mut ByteWriter, palette: &[String], data: Option<&[u32]>) {
    writer.write_string_array(palette);
    if palette.len() > 1 {
        if let Some(data) = data {
            writer.write_long_array(&pack(data, bits_per_entry(palette.len())));
        }
    }
}

fn write_light(writer: &mut ByteWriter, light: &Light) {
    writer.write_u8(light.content() as u8);
    if let Some(data) = light.data() {
        writer.write_bytes(data.as_slice());
    }
}

/// Reads one section record.
pub fn read_section(reader: &mut ByteReader<'_>, ctx: &DecodeContext<'_>) -> FormatResult<PolarSection> {
    if reader.read_u8()? == 1 {
        return Ok(PolarSection::default());
    }

    let mut block_palette = reader.read_string_array(MAX_BLOCK_PALETTE)?;
    if ctx.needs_conversion() {
        ctx.converter
            .convert_block_palette(&mut block_palette, ctx.data_version, ctx.target_data_version());
    }
    if ctx.features.short_grass_rename {
        rename_short_grass(&mut block_palette);
    }
    let block_data = read_indices(reader, block_palette.len(), BLOCK_CAPACITY)?;

    let biome_palette = reader.read_string_array(MAX_BIOME_PALETTE)?;
    let biome_data = read_indices(reader, biome_palette.len(), BIOME_CAPACITY)?;

    let (block_light, sky_light) = match ctx.features.light {
        LightEncoding::ContentTag => (read_tagged_light(reader)?, read_tagged_light(reader)?),
        LightEncoding::Flags => (read_flagged_light(reader)?, read_flagged_light(reader)?),
        LightEncoding::Unified => {
            if reader.read_u8()? == 1 {
                (read_light_data(reader)?, read_light_data(reader)?)
            } else {
                (Light::Missing, Light::Missing)
            }
        }
    };

    Ok(PolarSection::new(block_palette, block_data, biome_palette, biome_data)?
        .with_block_light(block_light)
        .with_sky_light(sky_light))
}

fn read_indices(reader: &mut ByteReader<'_>, palette_len: usize, capacity: usize) -> FormatResult<Option<Vec<u32>>> {
    if palette_len <= 1 {
        return Ok(None);
    }
    let bits = bits_per_entry(palette_len);
    let words = reader.read_long_array()?;
    if words.len() < packed_len(capacity, bits) {
        return Err(FormatError::MalformedSection("packed index array too short"));
    }
    Ok(Some(unpack(&words, bits, capacity)))
}

fn read_tagged_light(reader: &mut ByteReader<'_>) -> FormatResult<Light> {
    Ok(match LightContent::from_byte(reader.read_u8()?)? {
        LightContent::Missing => Light::Missing,
        LightContent::Empty => Light::Empty,
        LightContent::Full => Light::Full,
        LightContent::Present => read_light_data(reader)?,
    })
}

fn read_flagged_light(reader: &mut ByteReader<'_>) -> FormatResult<Light> {
    if reader.read_bool()? {
        read_light_data(reader)
    } else {
        Ok(Light::Missing)
    }
}

fn read_light_data(reader: &mut ByteReader<'_>) -> FormatResult<Light> {
    let mut data = Box::new([0u8; LIGHT_LEN]);
    data.copy_from_slice(reader.read_bytes(LIGHT_LEN)?);
    Ok(Light::Present(data))
}

/// Replaces the pre-rename `grass` block with `short_grass`.
///
/// Matches on the identifier path only, ignoring namespace and block state
/// properties.
fn rename_short_grass(palette: &mut [String]) {
    for entry in palette.iter_mut() {
        let id = entry.find('[').map_or(entry.as_str(), |i| &entry[..i]);
        let path = id.split_once(':').map_or(id, |(_, path)| path);
        if path == "grass" {
            *entry = "short_grass".to_owned();
        }
    }
}
