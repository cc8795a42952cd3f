//! # Coordinate Packing
//!
//! Chunk coordinates pack into one `i64` map key; block positions inside a
//! chunk pack into one `i32` index.
//!
//! ## Block Index Layout
//!
//! ```text
//! bits 28-31  local z (0-15)
//! bit  27     y sign (1 = negative)
//! bits 4-26   |y|
//! bits 0-3    local x (0-15)
//! ```

const Y_MASK: i32 = 0x07FF_FFF0;
const Y_SIGN: i32 = 1 << 27;

/// Largest `|y|` a block index can hold.
pub const MAX_BLOCK_Y: i32 = (1 << 23) - 1;

/// Packs chunk coordinates into a map key.
#[inline]
#[must_use]
pub const fn chunk_key(x: i32, z: i32) -> i64 {
    ((x as i64) << 32) | (z as u32 as i64)
}

/// Chunk x of a key produced by [`chunk_key`].
#[inline]
#[must_use]
pub const fn chunk_key_x(key: i64) -> i32 {
    (key >> 32) as i32
}

/// Chunk z of a key produced by [`chunk_key`].
#[inline]
#[must_use]
pub const fn chunk_key_z(key: i64) -> i32 {
    key as i32
}

/// Packs a chunk-local block position into a block-entity index.
///
/// `x` and `z` are taken modulo 16. `y` is absolute; only `|y| <= MAX_BLOCK_Y`
/// survives the round trip, larger magnitudes are masked.
#[inline]
#[must_use]
pub const fn block_index(x: i32, y: i32, z: i32) -> i32 {
    let mut index = x & 0xF;
    if y > 0 {
        index |= (y << 4) & Y_MASK;
    } else {
        index |= (((y.unsigned_abs() << 4) as i32) & Y_MASK) | Y_SIGN;
    }
    index | ((z & 0xF) << 28)
}

/// Unpacks a block-entity index into `(x, y, z)`.
#[inline]
#[must_use]
pub const fn block_position(index: i32) -> (i32, i32, i32) {
    let x = index & 0xF;
    let mut y = (index & Y_MASK) >> 4;
    if index & Y_SIGN != 0 {
        y = -y;
    }
    let z = (index >> 28) & 0xF;
    (x, y, z)
}
