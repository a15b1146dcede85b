//! Word codec.
//!
//! Every operand fetch and store passes through these helpers. Multi-byte fields
//! are big-endian; 1-byte and 3-byte fields are sign-extended from their top bit.

use super::constants::{WORD_BYTES, WORD_MASK};

/// Sign-extends the low `bits` bits of `value`.
///
/// # Arguments
///
/// * `value` - The raw field value.
/// * `bits` - Width of the field in bits (1-32).
///
/// # Returns
///
/// The field interpreted as a two's complement number.
#[inline]
pub const fn sign_extend(value: u32, bits: u32) -> i32 {
    if bits == 0 || bits >= 32 {
        return value as i32;
    }
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Sign-extends a 24-bit word.
#[inline]
pub const fn sign_extend_24(value: u32) -> i32 {
    sign_extend(value & WORD_MASK, 24)
}

/// Converts a big-endian byte field to a signed integer.
///
/// 1-byte and 3-byte fields are sign-extended from bit 7 of their first byte.
/// Other widths are combined without sign extension. An empty slice yields 0.
///
/// # Arguments
///
/// * `bytes` - The big-endian field, at most 4 bytes are significant.
///
/// # Returns
///
/// The decoded value.
pub fn bytes_to_signed_int(bytes: &[u8]) -> i32 {
    let raw = bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    match bytes.len() {
        1 => sign_extend(raw, 8),
        WORD_BYTES => sign_extend(raw, 24),
        _ => raw as i32,
    }
}

/// Converts a value to a 3-byte big-endian word (the low 24 bits of `value`).
pub const fn int_to_bytes(value: i32) -> [u8; WORD_BYTES] {
    let v = value as u32;
    [(v >> 16) as u8, (v >> 8) as u8, v as u8]
}

/// Converts a 3-byte big-endian word to its unsigned 24-bit value.
pub const fn word_from_bytes(bytes: [u8; WORD_BYTES]) -> u32 {
    ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
}
