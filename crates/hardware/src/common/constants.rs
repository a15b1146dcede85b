//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Memory Constants:** Backing memory size and the addressable word width.
//! 2. **Register Constants:** Register count and the 24-bit value mask.
//! 3. **Condition Codes:** The status word encodings produced by comparisons.

use serde::Serialize;

/// Size of the backing memory array in bytes (64 KiB).
///
/// Instruction encodings can express 20-bit (format 4) and 24-bit (indexed)
/// addresses, but only the first 64 KiB are backed. Anything at or above
/// `MEMORY_SIZE` fails the bounds check.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Width of a machine word in bytes.
pub const WORD_BYTES: usize = 3;

/// Mask applied to every general-register write and every effective address.
pub const WORD_MASK: u32 = 0xFF_FFFF;

/// Number of register slots (A, X, L, B, S, T, F, unused, PC, SW).
pub const REGISTER_COUNT: usize = 10;

/// Sign bit of a 24-bit word.
pub const WORD_SIGN_BIT: u32 = 0x80_0000;

/// Condition code stored in `SW` by COMP, COMPR, TIX, TIXR, and TD.
///
/// The numeric encoding is not ordered: `Less` is 1 and `Greater` is 2 with
/// `Equal` at 0. Conditional jumps compare `SW` against these exact values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[repr(u32)]
pub enum ConditionCode {
    /// Operands compared equal (or a device tested not ready).
    Equal = 0x00,
    /// First operand was less (or a device tested ready).
    Less = 0x01,
    /// First operand was greater.
    Greater = 0x02,
}

impl ConditionCode {
    /// Returns the condition code for a signed comparison of `lhs` against `rhs`.
    pub fn compare(lhs: i64, rhs: i64) -> Self {
        match lhs.cmp(&rhs) {
            std::cmp::Ordering::Less => Self::Less,
            std::cmp::Ordering::Equal => Self::Equal,
            std::cmp::Ordering::Greater => Self::Greater,
        }
    }

    /// Decodes a raw `SW` value; anything other than 0, 1, or 2 yields `None`.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x00 => Some(Self::Equal),
            0x01 => Some(Self::Less),
            0x02 => Some(Self::Greater),
            _ => None,
        }
    }

    /// Short mnemonic used in execution traces.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQ",
            Self::Less => "LT",
            Self::Greater => "GT",
        }
    }
}
