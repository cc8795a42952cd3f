//! # Palette Bit Packing
//!
//! Palette indices are stored as fixed-width fields inside 64-bit words.
//!
//! ## Layout
//!
//! ```text
//! entries per word = floor(64 / bits)
//!
//! word 0: [ e0 | e1 | e2 | ... | unused high bits (zero) ]
//!           ^ bit 0
//! ```
//!
//! Entries never straddle a word boundary. When `64 / bits` is not exact the
//! leftover high bits of each word are zero.

/// Number of bits needed to index a palette of `palette_len` entries.
///
/// A palette of one entry needs no index array at all; callers skip packing
/// in that case. The result is still at least 1 so it is safe to pass to
/// [`pack`].
#[inline]
#[must_use]
pub const fn bits_per_entry(palette_len: usize) -> u32 {
    if palette_len <= 1 {
        return 1;
    }
    usize::BITS - (palette_len - 1).leading_zeros()
}

/// Number of bits needed to hold `value` itself (`0` needs zero bits).
#[inline]
#[must_use]
pub const fn bits_to_represent(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Entries that fit in one word at `bits` per entry.
#[inline]
#[must_use]
pub const fn entries_per_word(bits: u32) -> usize {
    (64 / bits) as usize
}

/// Words needed to pack `len` entries at `bits` per entry.
#[inline]
#[must_use]
pub const fn packed_len(len: usize, bits: u32) -> usize {
    len.div_ceil(entries_per_word(bits))
}

#[inline]
const fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// Packs `values` into words, `bits` bits each, least significant first.
///
/// `bits` must be in `1..=32`. Value bits above `bits` are discarded.
#[must_use]
pub fn pack(values: &[u32], bits: u32) -> Vec<u64> {
    debug_assert!((1..=32).contains(&bits), "bits out of range: {bits}");
    let per_word = entries_per_word(bits);
    let mask = mask(bits);
    let mut words = vec![0u64; packed_len(values.len(), bits)];

    for (i, &value) in values.iter().enumerate() {
        let shift = bits as usize * (i % per_word);
        words[i / per_word] |= (u64::from(value) & mask) << shift;
    }
    words
}

/// Unpacks `out_len` entries of `bits` bits each.
///
/// Entries past the end of `words` read as zero; callers that need strict
/// length checking compare against [`packed_len`] first.
#[must_use]
pub fn unpack(words: &[u64], bits: u32, out_len: usize) -> Vec<u32> {
    debug_assert!((1..=32).contains(&bits), "bits out of range: {bits}");
    let per_word = entries_per_word(bits);
    let mask = mask(bits);

    (0..out_len)
        .map(|i| {
            let word = words.get(i / per_word).copied().unwrap_or(0);
            let shift = bits as usize * (i % per_word);
            ((word >> shift) & mask) as u32
        })
        .collect()
}
