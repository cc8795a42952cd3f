//! # World Reader
//!
//! Decodes a complete world from bytes, accepting every historical revision.
//!
//! ## Container
//!
//! ```text
//! u32     magic "Polr"
//! u16     version
//! varint  data version        (version 6+)
//! u8      compression
//! varint  uncompressed length
//! bytes   payload
//!   i8      min section
//!   i8      max section
//!   bytes   world user data   (version 5+)
//!   varint  chunk count
//!   chunk × count
//! ```
//!
//! Any mismatch is fatal; a failed read yields no world.

use crate::bytes::ByteReader;
use crate::chunk::read_chunk;
use crate::compression::CompressionType;
use crate::converter::{DataConverter, NoopConverter};
use crate::error::{CodecResult, FormatError};
use crate::version::{FormatFeatures, MAGIC};
use crate::world::PolarWorld;

/// Per-read state shared by the section and chunk decoders.
pub struct DecodeContext<'a> {
    /// Optional fields of the revision being read.
    pub features: FormatFeatures,
    /// Data version declared by the header.
    pub data_version: i32,
    /// Converter for outdated identifiers.
    pub converter: &'a dyn DataConverter,
}

impl<'a> DecodeContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(features: FormatFeatures, data_version: i32, converter: &'a dyn DataConverter) -> Self {
        Self {
            features,
            data_version,
            converter,
        }
    }

    /// True if identifiers must be converted on read.
    #[inline]
    #[must_use]
    pub fn needs_conversion(&self) -> bool {
        self.data_version < self.converter.current_data_version()
    }

    /// Data version conversion targets.
    #[inline]
    #[must_use]
    pub fn target_data_version(&self) -> i32 {
        self.converter.current_data_version()
    }
}

/// Decodes a world without identifier conversion.
pub fn read_world(bytes: &[u8]) -> CodecResult<PolarWorld> {
    read_world_with_converter(bytes, &NoopConverter::default())
}

/// Decodes a world, converting outdated identifiers with `converter`.
///
/// When conversion runs, the returned world reports the converter's current
/// data version.
pub fn read_world_with_converter(bytes: &[u8], converter: &dyn DataConverter) -> CodecResult<PolarWorld> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.read_u32()?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic {
            expected: MAGIC,
            found: magic,
        }
        .into());
    }

    let version = reader.read_u16()?;
    let features = FormatFeatures::for_version(version)?;

    let data_version = if features.data_version {
        reader.read_var_int()?
    } else {
        converter.default_data_version()
    };

    let compression = CompressionType::from_byte(reader.read_u8()?)?;
    let length = reader.read_length()?;
    let payload = match compression {
        CompressionType::None => reader.read_bytes(length)?.to_vec(),
        CompressionType::Zstd => compression.decompress(reader.read_rest(), length)?,
    };

    let ctx = DecodeContext::new(features, data_version, converter);
    let mut payload = ByteReader::new(&payload);

    let min_section = payload.read_i8()?;
    let max_section = payload.read_i8()?;
    if min_section >= max_section {
        return Err(FormatError::InvalidSectionBounds {
            min: min_section,
            max: max_section,
        }
        .into());
    }
    let section_count = (i32::from(max_section) - i32::from(min_section) + 1) as usize;

    let user_data = if features.world_user_data {
        payload.read_byte_array()?
    } else {
        Vec::new()
    };

    let chunk_count = payload.read_length()?;
    let mut chunks = Vec::with_capacity(chunk_count.min(payload.remaining()));
    for _ in 0..chunk_count {
        chunks.push(read_chunk(&mut payload, &ctx, section_count)?);
    }

    let stored_data_version = if ctx.needs_conversion() {
        tracing::debug!(
            "Converted polar world from data version {} to {}",
            data_version,
            ctx.target_data_version()
        );
        ctx.target_data_version()
    } else {
        data_version
    };

    tracing::debug!(
        "Decoded polar world: version {}, data version {}, {} chunks, {:?} compression",
        version,
        data_version,
        chunk_count,
        compression
    );

    Ok(PolarWorld::from_parts(
        version,
        stored_data_version,
        compression,
        min_section,
        max_section,
        user_data,
        chunks,
    )?)
}
