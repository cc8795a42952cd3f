//! World user-data helpers.
//!
//! The world blob is opaque to the codec. Hosts that paste worlds as
//! schematics store the paste offset in it:
//!
//! ```text
//! u8   feature version (1)
//! i32  x, i32 y, i32 z
//! ```

use crate::bytes::{ByteReader, ByteWriter};
use crate::error::FormatResult;

/// Feature version written by [`write_schematic_offset`].
pub const WORLD_FEATURES_VERSION: u8 = 1;

/// First feature version that carries a schematic offset.
const SCHEMATIC_OFFSET_VERSION: u8 = 1;

/// Reads the schematic offset, if the blob carries one.
pub fn read_schematic_offset(user_data: &[u8]) -> FormatResult<Option<(i32, i32, i32)>> {
    if user_data.is_empty() {
        return Ok(None);
    }
    let mut reader = ByteReader::new(user_data);
    if reader.read_u8()? < SCHEMATIC_OFFSET_VERSION {
        return Ok(None);
    }
    Ok(Some((reader.read_i32()?, reader.read_i32()?, reader.read_i32()?)))
}

/// Builds a world user-data blob holding a schematic offset.
#[must_use]
pub fn write_schematic_offset(x: i32, y: i32, z: i32) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(13);
    writer.write_u8(WORLD_FEATURES_VERSION);
    writer.write_i32(x);
    writer.write_i32(y);
    writer.write_i32(z);
    writer.into_inner()
}
