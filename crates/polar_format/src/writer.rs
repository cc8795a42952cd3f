//! # World Writer
//!
//! Encodes a world at the latest format version. The whole file is built in
//! memory; callers persist it with a single write.
//!
//! Chunks are written in `(x, z)` order, so equal worlds encode to equal
//! bytes.

use crate::bytes::ByteWriter;
use crate::chunk::write_chunk;
use crate::converter::DataConverter;
use crate::error::CodecResult;
use crate::version::{LATEST_VERSION, MAGIC};
use crate::world::PolarWorld;

/// Bytes reserved per chunk before the payload is assembled.
const CHUNK_SIZE_HINT: usize = 1024;

/// Encodes `world`, stamping its own data version in the header.
pub fn write_world(world: &PolarWorld) -> CodecResult<Vec<u8>> {
    encode(world, world.data_version())
}

/// Encodes `world`, stamping the converter's current data version in the
/// header.
pub fn write_world_with_converter(world: &PolarWorld, converter: &dyn DataConverter) -> CodecResult<Vec<u8>> {
    encode(world, converter.current_data_version())
}

fn encode(world: &PolarWorld, data_version: i32) -> CodecResult<Vec<u8>> {
    let section_count = world.section_count();
    let chunks: Vec<_> = world.chunks().into_iter().filter(|chunk| !chunk.is_empty()).collect();
    let user_data = world.user_data();
    let compression = world.compression();

    let mut payload = ByteWriter::with_capacity(chunks.len() * CHUNK_SIZE_HINT + user_data.len() + 8);
    payload.write_i8(world.min_section());
    payload.write_i8(world.max_section());
    payload.write_byte_array(&user_data);
    payload.write_length(chunks.len());
    for chunk in &chunks {
        write_chunk(&mut payload, chunk, section_count)?;
    }
    let payload = payload.into_inner();
    let packed = compression.compress(&payload)?;

    let mut out = ByteWriter::with_capacity(packed.len() + 16);
    out.write_u32(MAGIC);
    out.write_u16(LATEST_VERSION);
    out.write_var_int(data_version);
    out.write_u8(compression.as_byte());
    out.write_length(payload.len());
    out.write_bytes(&packed);

    tracing::debug!(
        "Encoded polar world: {} chunks, {} bytes ({} uncompressed)",
        chunks.len(),
        packed.len(),
        payload.len()
    );

    Ok(out.into_inner())
}
