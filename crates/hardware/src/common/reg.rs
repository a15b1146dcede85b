//! Register File.
//!
//! This module provides the `RegisterFile` struct holding the SIC/XE architectural
//! registers. It provides:
//! 1. **Indexed Access:** Registers addressed by their 4-bit hardware number, as
//!    format 2 instructions encode them.
//! 2. **Masking:** General registers are 24 bits wide; every write is masked.
//! 3. **Floating Point:** `F` is held separately as an `f64`.
//!
//! Invalid indices (7, anything above 9, and `F` through the integer interface) read
//! as zero and ignore writes.

use std::fmt;

use serde::Serialize;

use super::constants::{REGISTER_COUNT, WORD_MASK};
use super::word::sign_extend_24;

/// Architectural register numbers as encoded in instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Register {
    /// Accumulator.
    A = 0,
    /// Index register.
    X = 1,
    /// Linkage register (JSUB return address).
    L = 2,
    /// Base register.
    B = 3,
    /// General register S.
    S = 4,
    /// General register T.
    T = 5,
    /// Floating-point accumulator.
    F = 6,
    /// Program counter.
    PC = 8,
    /// Status word (condition code).
    SW = 9,
}

impl Register {
    /// All addressable registers in hardware-number order.
    pub const ALL: [Self; 9] = [
        Self::A,
        Self::X,
        Self::L,
        Self::B,
        Self::S,
        Self::T,
        Self::F,
        Self::PC,
        Self::SW,
    ];

    /// Maps a hardware register number to a register.
    pub const fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Self::A),
            1 => Some(Self::X),
            2 => Some(Self::L),
            3 => Some(Self::B),
            4 => Some(Self::S),
            5 => Some(Self::T),
            6 => Some(Self::F),
            8 => Some(Self::PC),
            9 => Some(Self::SW),
            _ => None,
        }
    }

    /// Hardware register number.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Assembler name of the register.
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::X => "X",
            Self::L => "L",
            Self::B => "B",
            Self::S => "S",
            Self::T => "T",
            Self::F => "F",
            Self::PC => "PC",
            Self::SW => "SW",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Register file containing the integer registers and the floating accumulator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegisterFile {
    regs: [u32; REGISTER_COUNT],
    f: f64,
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    const fn is_integer(idx: usize) -> bool {
        idx < REGISTER_COUNT && idx != Register::F as usize && idx != 7
    }

    /// Reads a register by hardware number.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register number (0-9). `F`, 7, and out-of-range numbers read as 0.
    ///
    /// # Returns
    ///
    /// The unsigned 24-bit register value.
    pub fn read(&self, idx: usize) -> u32 {
        if Self::is_integer(idx) {
            self.regs[idx]
        } else {
            0
        }
    }

    /// Reads a register by hardware number, sign-extended from 24 bits.
    pub fn read_signed(&self, idx: usize) -> i32 {
        sign_extend_24(self.read(idx))
    }

    /// Writes a register by hardware number.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register number (0-9). Writes to `F`, 7, and out-of-range numbers are ignored.
    /// * `val` - The value to write; only the low 24 bits are kept.
    pub fn write(&mut self, idx: usize, val: u32) {
        if Self::is_integer(idx) {
            self.regs[idx] = val & WORD_MASK;
        }
    }

    /// Reads a named register. `F` reads as 0; use [`RegisterFile::read_f`].
    pub fn get(&self, reg: Register) -> u32 {
        self.read(reg.index())
    }

    /// Writes a named register, masked to 24 bits.
    pub fn set(&mut self, reg: Register, val: u32) {
        self.write(reg.index(), val);
    }

    /// Reads the floating accumulator.
    pub const fn read_f(&self) -> f64 {
        self.f
    }

    /// Writes the floating accumulator.
    pub fn write_f(&mut self, val: f64) {
        self.f = val;
    }

    /// Returns the program counter.
    pub fn pc(&self) -> u32 {
        self.get(Register::PC)
    }

    /// Sets the program counter.
    pub fn set_pc(&mut self, pc: u32) {
        self.set(Register::PC, pc);
    }
}
