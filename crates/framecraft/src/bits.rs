//! Word-level bit manipulation used by bitmapped fields.
//!
//! Bits are addressed LSB-first: offset 0 is the least significant bit of the word.

/// Returns a mask with the low `width` bits set. Widths of 32 or more give `u32::MAX`.
pub const fn mask(width: u32) -> u32 {
    if width >= u32::BITS {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Reads `width` bits of `word` starting at bit `offset`.
pub const fn extract(word: u32, offset: u32, width: u32) -> u32 {
    if offset >= u32::BITS {
        return 0;
    }

    (word >> offset) & mask(width)
}

/// Replaces `width` bits of `word` starting at bit `offset` with the low bits of `value`.
/// Bits of `value` above `width` are discarded.
pub const fn insert(word: u32, offset: u32, width: u32, value: u32) -> u32 {
    if offset >= u32::BITS {
        return word;
    }

    let field_mask = mask(width) << offset;
    (word & !field_mask) | ((value & mask(width)) << offset)
}

/// Sign-extends the low `bits` of `value` to a full `i32`.
pub fn sign_extend(value: u32, bits: u32) -> i32 {
    if bits == 0 {
        return 0;
    }
    if bits >= u32::BITS {
        return value as i32;
    }

    let shift = u32::BITS - bits;
    ((value << shift) as i32) >> shift
}
