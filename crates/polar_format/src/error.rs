//! # Codec Error Types
//!
//! Everything that can go wrong while reading or writing a Polar world.
//! All of these are fatal to the call that produced them; nothing is retried.

use thiserror::Error;

/// The input bytes do not describe a valid Polar world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The first four bytes are not the `Polr` signature.
    #[error("invalid magic number: expected {expected:#010x}, found {found:#010x}")]
    BadMagic {
        /// The signature every Polar file starts with.
        expected: u32,
        /// What the input actually started with.
        found: u32,
    },

    /// The format version is newer than this reader understands.
    #[error("unsupported polar version: up to {latest} is supported, found {found}")]
    UnsupportedVersion {
        /// Version found in the header.
        found: u16,
        /// Latest version this reader can decode.
        latest: u16,
    },

    /// The compression byte does not name a known compression type.
    #[error("invalid compression type: {0}")]
    BadCompression(u8),

    /// The input ended before a field could be read completely.
    #[error("truncated input: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    TruncatedInput {
        /// Byte offset of the read that failed.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A palette declares more entries than its cap allows.
    #[error("palette overflow: {len} entries exceeds maximum of {max}")]
    PaletteOverflow {
        /// Declared palette length.
        len: usize,
        /// Cap for this palette kind.
        max: usize,
    },

    /// `minSection` is not strictly below `maxSection`.
    #[error("invalid section range: min {min} must be below max {max}")]
    InvalidSectionBounds {
        /// Lowest section index.
        min: i8,
        /// Highest section index.
        max: i8,
    },

    /// A light content tag outside the known range.
    #[error("invalid light content tag: {0}")]
    BadLightContent(u8),

    /// A length prefix decoded to a negative number.
    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    /// A VarInt ran past five bytes.
    #[error("varint is too long")]
    VarIntTooLong,

    /// A string field is not valid UTF-8.
    #[error("string is not valid utf-8")]
    InvalidString,

    /// A section's palette and index data disagree.
    #[error("malformed section: {0}")]
    MalformedSection(&'static str),

    /// A tag compound could not be decoded or encoded.
    #[error("malformed tag data: {0}")]
    MalformedTag(String),

    /// A tag string exceeds the `u16` length prefix once encoded.
    #[error("tag string of {len} bytes exceeds the {max} byte limit")]
    TagStringTooLong {
        /// Encoded length of the string.
        len: usize,
        /// Largest encodable length.
        max: usize,
    },

    /// A palette index points past the end of its palette.
    #[error("palette index {index} out of range for palette of {len} entries")]
    PaletteIndexOutOfRange {
        /// Offending index.
        index: u32,
        /// Palette length.
        len: usize,
    },

    /// A heightmap value does not fit the world's heightmap width.
    #[error("height {height} does not fit in {bits} bits")]
    HeightOutOfRange {
        /// Offending height.
        height: u32,
        /// Bits available per entry.
        bits: u32,
    },

    /// A chunk does not span the world's vertical extent.
    #[error("chunk has {found} sections, world expects {expected}")]
    SectionCountMismatch {
        /// `max_section - min_section + 1` of the world.
        expected: usize,
        /// Sections the chunk actually has.
        found: usize,
    },

    /// A structured user-data blob could not be decoded.
    #[error("malformed user data: {0}")]
    MalformedUserData(&'static str),
}

/// Errors surfaced by the world reader and writer.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The bytes violate the format.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The compression library failed.
    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns the underlying format error, if that is what this is.
    #[must_use]
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            Self::Format(e) => Some(e),
            Self::Io(_) => None,
        }
    }
}

/// Result type for low-level decoding.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result type for whole-world reads and writes.
pub type CodecResult<T> = Result<T, CodecError>;
