//! Bit level helpers used for decoding instruction words.

/// Gives `count` contiguous bits of `word` starting at the 1-based bit `position`,
/// bit 1 being the least significant bit.
///
/// The result is unsigned and in the range `0..2^count`.
///
/// # Panics
/// - the field is empty or reaches past bit 16
#[must_use]
pub fn extract_bits(word: u16, count: u8, position: u8) -> u16 {
    assert!(
        count > 0 && position > 0,
        "empty field: count {count:?}, position {position:?}"
    );
    assert!(
        u32::from(count) + u32::from(position) - 1 <= u16::BITS,
        "field of {count:?} bits at position {position:?} does not fit into u16"
    );
    let mask = (1u32 << count) - 1;
    let field = (u32::from(word) >> (position - 1)) & mask;
    u16::try_from(field).expect("masked field fits into u16")
}

/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// `bits` must only have its lowest `valid_bits` bits set.
///
/// # Panics
/// - `valid_bits` is not in `1..=15`
#[must_use]
pub const fn sign_extend(bits: u16, valid_bits: u8) -> u16 {
    assert!(valid_bits > 0 && valid_bits < 16, "invalid field width");
    let most_significant_bit = (bits >> (valid_bits - 1)) & 1;
    if most_significant_bit == 1 {
        // negative: 1-extend
        bits | (0xFFFF << valid_bits)
    } else {
        // positive, already 0-extended
        bits
    }
}

/// Extracts a two's complement field and widens it to a signed 16-bit value.
#[must_use]
pub fn signed_field(word: u16, count: u8, position: u8) -> i16 {
    twos_complement_to_decimal(sign_extend(extract_bits(word, count, position), count))
}

#[must_use]
pub const fn twos_complement_to_decimal(bin_rep: u16) -> i16 {
    bin_rep.cast_signed()
}
