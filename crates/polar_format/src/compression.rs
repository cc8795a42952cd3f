//! # Payload Compression
//!
//! The inner payload of a world is optionally Zstandard-compressed. The
//! header stores the uncompressed length so decompression can size its
//! output buffer exactly.

use crate::error::{CodecResult, FormatError, FormatResult};

/// Compression applied to the world payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CompressionType {
    /// Stored as-is.
    None = 0,
    /// Zstandard.
    #[default]
    Zstd = 1,
}

impl CompressionType {
    /// Maps the header byte to a compression type.
    pub const fn from_byte(byte: u8) -> FormatResult<Self> {
        match byte {
            0 => Ok(Self::None),
            1 => Ok(Self::Zstd),
            other => Err(FormatError::BadCompression(other)),
        }
    }

    /// The header byte for this compression type.
    #[inline]
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Compresses `data`.
    pub fn compress(self, data: &[u8]) -> CodecResult<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Zstd => Ok(zstd::bulk::compress(data, zstd::DEFAULT_COMPRESSION_LEVEL)?),
        }
    }

    /// Decompresses `data` into a buffer of at most `original_len` bytes.
    pub fn decompress(self, data: &[u8], original_len: usize) -> CodecResult<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Zstd => Ok(zstd::bulk::decompress(data, original_len)?),
        }
    }
}
