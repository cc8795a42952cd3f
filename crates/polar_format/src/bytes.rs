//! # Byte Encoding Primitives
//!
//! Big-endian fixed-width integers, VarInts, and length-prefixed arrays.
//!
//! ## VarInt
//!
//! Seven data bits per byte, least significant group first, high bit set on
//! every byte except the last. The value is taken as its 32-bit two's
//! complement pattern (no zig-zag), so every negative number occupies
//! exactly five bytes.
//!
//! ## Arrays
//!
//! ```text
//! byte array    varint len, len bytes
//! string        varint byte len, utf-8 bytes
//! string array  varint count, count strings
//! long array    varint count, count big-endian i64
//! optional<T>   u8 present (1 = yes), T if present
//! ```

use crate::error::{FormatError, FormatResult};

/// Longest possible encoding of a 32-bit VarInt.
pub const MAX_VAR_INT_SIZE: usize = 5;

/// Number of bytes `value` occupies as a VarInt.
#[must_use]
pub const fn var_int_size(value: i32) -> usize {
    let bits = value as u32;
    match bits {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Encodes a single VarInt into a fresh buffer.
#[must_use]
pub fn encode_var_int(value: i32) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(MAX_VAR_INT_SIZE);
    writer.write_var_int(value);
    writer.into_inner()
}

/// Growable big-endian writer.
///
/// Writes never fail; the buffer grows as needed. The finished bytes are
/// taken out with [`ByteWriter::into_inner`].
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates an empty writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a slice of the written data.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer, returning the written bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a signed byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    /// Writes a boolean as `1` or `0`.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Writes a u16 in big-endian format.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a u32 in big-endian format.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an i32 in big-endian format.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an i64 in big-endian format.
    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a u64 in big-endian format.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an f32 in big-endian format.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an f64 in big-endian format.
    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes raw bytes with no prefix.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a VarInt.
    pub fn write_var_int(&mut self, value: i32) {
        let mut bits = value as u32;
        loop {
            if bits & !0x7F == 0 {
                self.buffer.push(bits as u8);
                return;
            }
            self.buffer.push((bits & 0x7F) as u8 | 0x80);
            bits >>= 7;
        }
    }

    /// Writes a VarInt length prefix.
    #[inline]
    pub fn write_length(&mut self, len: usize) {
        self.write_var_int(len as i32);
    }

    /// Writes a length-prefixed byte array.
    pub fn write_byte_array(&mut self, bytes: &[u8]) {
        self.write_length(bytes.len());
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) {
        self.write_byte_array(value.as_bytes());
    }

    /// Writes a presence byte followed by the string when present.
    pub fn write_optional_string(&mut self, value: Option<&str>) {
        self.write_bool(value.is_some());
        if let Some(value) = value {
            self.write_string(value);
        }
    }

    /// Writes a count-prefixed list of strings.
    pub fn write_string_array<S: AsRef<str>>(&mut self, values: &[S]) {
        self.write_length(values.len());
        for value in values {
            self.write_string(value.as_ref());
        }
    }

    /// Writes a count-prefixed array of 64-bit words.
    pub fn write_long_array(&mut self, values: &[u64]) {
        self.write_length(values.len());
        for &value in values {
            self.write_u64(value);
        }
    }
}

/// Cursor over an immutable byte slice.
///
/// Every read checks the remaining length first and reports
/// [`FormatError::TruncatedInput`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `buffer`.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Returns the current offset into the buffer.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns true if every byte has been consumed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns everything not yet consumed, consuming it.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.buffer[self.position..];
        self.position = self.buffer.len();
        rest
    }

    /// Returns everything not yet consumed without advancing.
    #[inline]
    #[must_use]
    pub fn peek_rest(&self) -> &'a [u8] {
        &self.buffer[self.position..]
    }

    /// Advances past `len` bytes.
    pub fn skip(&mut self, len: usize) -> FormatResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Reads exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        self.ensure(len)?;
        let slice = &self.buffer[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Reads a fixed-size array of raw bytes.
    pub fn read_array<const N: usize>(&mut self) -> FormatResult<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> FormatResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> FormatResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads a boolean; any byte other than `1` is false.
    #[inline]
    pub fn read_bool(&mut self) -> FormatResult<bool> {
        Ok(self.read_u8()? == 1)
    }

    /// Reads a u16 in big-endian format.
    #[inline]
    pub fn read_u16(&mut self) -> FormatResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Reads a u32 in big-endian format.
    #[inline]
    pub fn read_u32(&mut self) -> FormatResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Reads an i32 in big-endian format.
    #[inline]
    pub fn read_i32(&mut self) -> FormatResult<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    /// Reads an i64 in big-endian format.
    #[inline]
    pub fn read_i64(&mut self) -> FormatResult<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    /// Reads a u64 in big-endian format.
    #[inline]
    pub fn read_u64(&mut self) -> FormatResult<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads an f32 in big-endian format.
    #[inline]
    pub fn read_f32(&mut self) -> FormatResult<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Reads an f64 in big-endian format.
    #[inline]
    pub fn read_f64(&mut self) -> FormatResult<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Reads a VarInt.
    pub fn read_var_int(&mut self) -> FormatResult<i32> {
        let mut bits = 0u32;
        for group in 0..MAX_VAR_INT_SIZE {
            let byte = self.read_u8()?;
            bits |= u32::from(byte & 0x7F) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(bits as i32);
            }
        }
        Err(FormatError::VarIntTooLong)
    }

    /// Reads a VarInt that must be a non-negative length.
    pub fn read_length(&mut self) -> FormatResult<usize> {
        let len = self.read_var_int()?;
        usize::try_from(len).map_err(|_| FormatError::NegativeLength(len))
    }

    /// Reads a length-prefixed byte array.
    pub fn read_byte_array(&mut self) -> FormatResult<Vec<u8>> {
        let len = self.read_length()?;
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> FormatResult<String> {
        let len = self.read_length()?;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| FormatError::InvalidString)
    }

    /// Reads a presence byte and, if set, a string.
    pub fn read_optional_string(&mut self) -> FormatResult<Option<String>> {
        if self.read_bool()? {
            self.read_string().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads a count-prefixed list of strings, rejecting counts above `max`.
    pub fn read_string_array(&mut self, max: usize) -> FormatResult<Vec<String>> {
        let len = self.read_length()?;
        if len > max {
            return Err(FormatError::PaletteOverflow { len, max });
        }
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_string()?);
        }
        Ok(values)
    }

    /// Reads a count-prefixed array of 64-bit words.
    pub fn read_long_array(&mut self) -> FormatResult<Vec<u64>> {
        let len = self.read_length()?;
        // Check up front so a corrupt count cannot trigger a huge allocation.
        self.ensure(len.saturating_mul(8))?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_u64()?);
        }
        Ok(values)
    }

    fn ensure(&self, needed: usize) -> FormatResult<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(FormatError::TruncatedInput {
                offset: self.position,
                needed,
                remaining,
            });
        }
        Ok(())
    }
}
