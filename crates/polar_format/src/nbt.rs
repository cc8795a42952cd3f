//! # Tag Compounds
//!
//! Block entities carry a hierarchical tag compound in the classic binary
//! tag layout. Tag payloads go through `quartz_nbt`, which speaks Java's
//! modified UTF-8; this module only deals with the root header, which comes
//! in two styles:
//!
//! ```text
//! named root     type (10), u16 name len, name, payload
//! nameless root  type (10), payload
//! ```
//!
//! Older worlds store the named style; everything written today is nameless.

use quartz_nbt::io::{read_nbt, write_nbt, Flavor, NbtIoError};
use std::io::{Cursor, Read};

pub use quartz_nbt::{NbtCompound, NbtList, NbtTag};

use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{FormatError, FormatResult};

/// Type id of a compound tag.
pub const COMPOUND_ID: u8 = 10;

/// Longest tag string, in encoded bytes, the `u16` prefix can describe.
pub const MAX_TAG_STRING_LEN: usize = u16::MAX as usize;

fn tag_error(e: &NbtIoError) -> FormatError {
    FormatError::MalformedTag(e.to_string())
}

// =============================================================================
// Reading
// =============================================================================

/// Reads a root compound in either the named or nameless style.
pub fn read_root(reader: &mut ByteReader<'_>, named: bool) -> FormatResult<NbtCompound> {
    let tag_type = reader.clone().read_u8()?;
    let rest = reader.peek_rest();

    let (compound, consumed) = if named {
        let mut cursor = Cursor::new(rest);
        let (compound, _) = read_nbt(&mut cursor, Flavor::Uncompressed).map_err(|e| tag_error(&e))?;
        (compound, cursor.position() as usize)
    } else {
        // An empty name turns the nameless layout into the named one.
        let header = [tag_type, 0, 0];
        let mut chained = (&header[..]).chain(Cursor::new(&rest[1..]));
        let (compound, _) = read_nbt(&mut chained, Flavor::Uncompressed).map_err(|e| tag_error(&e))?;
        let (_, payload) = chained.into_inner();
        (compound, 1 + payload.position() as usize)
    };

    reader.skip(consumed)?;
    Ok(compound)
}

// =============================================================================
// Writing
// =============================================================================

/// Writes `compound` as a nameless root.
pub fn write_root(writer: &mut ByteWriter, compound: &NbtCompound) -> FormatResult<()> {
    let bytes = encode_named("", compound)?;
    writer.write_u8(COMPOUND_ID);
    // Skip the type byte and the empty name's length.
    writer.write_bytes(bytes.get(3..).unwrap_or_default());
    Ok(())
}

/// Writes `compound` as a root named `name`.
pub fn write_named_root(writer: &mut ByteWriter, name: &str, compound: &NbtCompound) -> FormatResult<()> {
    let bytes = encode_named(name, compound)?;
    writer.write_bytes(&bytes);
    Ok(())
}

fn encode_named(name: &str, compound: &NbtCompound) -> FormatResult<Vec<u8>> {
    check_string(name)?;
    check_compound(compound)?;
    let mut bytes = Vec::new();
    write_nbt(&mut bytes, Some(name), compound, Flavor::Uncompressed).map_err(|e| tag_error(&e))?;
    Ok(bytes)
}

/// Length of `value` in Java's modified UTF-8.
#[must_use]
pub fn modified_utf8_len(value: &str) -> usize {
    value
        .chars()
        .map(|c| match u32::from(c) {
            0 => 2,
            0x01..=0x7F => 1,
            0x80..=0x7FF => 2,
            0x800..=0xFFFF => 3,
            _ => 6,
        })
        .sum()
}

fn check_string(value: &str) -> FormatResult<()> {
    let len = modified_utf8_len(value);
    if len > MAX_TAG_STRING_LEN {
        return Err(FormatError::TagStringTooLong {
            len,
            max: MAX_TAG_STRING_LEN,
        });
    }
    Ok(())
}

fn check_compound(compound: &NbtCompound) -> FormatResult<()> {
    for (name, tag) in compound.inner() {
        check_string(name)?;
        check_tag(tag)?;
    }
    Ok(())
}

fn check_tag(tag: &NbtTag) -> FormatResult<()> {
    match tag {
        NbtTag::String(value) => check_string(value),
        NbtTag::List(list) => list.iter().try_for_each(check_tag),
        NbtTag::Compound(compound) => check_compound(compound),
        _ => Ok(()),
    }
}
