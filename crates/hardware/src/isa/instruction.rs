//! Instruction encoding and field extraction.
//!
//! Provides the instruction format classes, the six nixbpe addressing flags, and the
//! `InstructionBits` trait for pulling fields out of raw instruction bytes.

use super::opcodes::OPCODE_MASK;

/// Indirect flag (bit 1 of byte 0).
pub const N_BIT: u8 = 0x02;
/// Immediate flag (bit 0 of byte 0).
pub const I_BIT: u8 = 0x01;
/// Indexed flag (bit 7 of byte 1).
pub const X_BIT: u8 = 0x80;
/// Base-relative flag (bit 6 of byte 1).
pub const B_BIT: u8 = 0x40;
/// PC-relative flag (bit 5 of byte 1).
pub const P_BIT: u8 = 0x20;
/// Extended-format flag (bit 4 of byte 1).
pub const E_BIT: u8 = 0x10;

/// Width of the format 3 displacement field.
pub const DISP_BITS: u32 = 12;
/// Width of the format 4 address field.
pub const ADDR_BITS: u32 = 20;

/// Instruction format class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// 1 byte, opcode only.
    One,
    /// 2 bytes, opcode plus two register numbers.
    Two,
    /// 3 bytes, or 4 when the `e` flag is set.
    ThreeFour,
}

/// The six addressing flags of a format 3/4 instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Indirect.
    pub n: bool,
    /// Immediate.
    pub i: bool,
    /// Indexed.
    pub x: bool,
    /// Base-relative.
    pub b: bool,
    /// PC-relative.
    pub p: bool,
    /// Extended (format 4).
    pub e: bool,
}

impl Flags {
    /// Extracts the flags from the first two instruction bytes.
    pub const fn from_bytes(b0: u8, b1: u8) -> Self {
        Self {
            n: b0 & N_BIT != 0,
            i: b0 & I_BIT != 0,
            x: b1 & X_BIT != 0,
            b: b1 & B_BIT != 0,
            p: b1 & P_BIT != 0,
            e: b1 & E_BIT != 0,
        }
    }

    /// Immediate addressing: `i` set, `n` clear.
    pub const fn is_immediate(self) -> bool {
        self.i && !self.n
    }

    /// Indirect addressing: `n` set, `i` clear.
    pub const fn is_indirect(self) -> bool {
        self.n && !self.i
    }

    /// SIC-compatible simple addressing: `n` and `i` both clear.
    pub const fn is_sic(self) -> bool {
        !self.n && !self.i
    }

    /// Whether a format 3 displacement is signed.
    pub const fn signed_displacement(self) -> bool {
        self.b || self.p || self.is_sic()
    }
}

/// Field extraction from raw instruction bytes.
///
/// Missing bytes read as zero; length checks happen before decoding.
pub trait InstructionBits {
    /// Opcode with the n and i bits cleared.
    fn opcode(&self) -> u8;
    /// Addressing flags.
    fn flags(&self) -> Flags;
    /// First register number of a format 2 instruction (high nibble of byte 1).
    fn r1(&self) -> u8;
    /// Second register number of a format 2 instruction (low nibble of byte 1).
    fn r2(&self) -> u8;
    /// Raw 12-bit (format 3) or 20-bit (format 4) address field.
    fn address_field(&self) -> u32;
}

impl InstructionBits for [u8] {
    fn opcode(&self) -> u8 {
        self.first().map_or(0, |b| b & OPCODE_MASK)
    }

    fn flags(&self) -> Flags {
        Flags::from_bytes(byte(self, 0), byte(self, 1))
    }

    fn r1(&self) -> u8 {
        byte(self, 1) >> 4
    }

    fn r2(&self) -> u8 {
        byte(self, 1) & 0x0F
    }

    fn address_field(&self) -> u32 {
        let high = u32::from(byte(self, 1) & 0x0F);
        if self.flags().e {
            (high << 16) | (u32::from(byte(self, 2)) << 8) | u32::from(byte(self, 3))
        } else {
            (high << 8) | u32::from(byte(self, 2))
        }
    }
}

#[inline]
fn byte(bytes: &[u8], idx: usize) -> u8 {
    bytes.get(idx).copied().unwrap_or(0)
}
