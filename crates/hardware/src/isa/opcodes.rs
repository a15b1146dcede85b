//! SIC/XE Opcodes.
//!
//! Defines the 6-bit operation codes (bits 7-2 of the first instruction byte, with the
//! n and i bits cleared).

/// Mask that clears the n and i bits of the first instruction byte.
pub const OPCODE_MASK: u8 = 0xFC;

/// Load A.
pub const LDA: u8 = 0x00;
/// Load X.
pub const LDX: u8 = 0x04;
/// Load L.
pub const LDL: u8 = 0x08;
/// Store A.
pub const STA: u8 = 0x0C;
/// Store X.
pub const STX: u8 = 0x10;
/// Store L.
pub const STL: u8 = 0x14;
/// A <- A + operand.
pub const ADD: u8 = 0x18;
/// A <- A - operand.
pub const SUB: u8 = 0x1C;
/// A <- A * operand.
pub const MUL: u8 = 0x20;
/// A <- A / operand.
pub const DIV: u8 = 0x24;
/// Compare A with operand.
pub const COMP: u8 = 0x28;
/// Increment X and compare with operand.
pub const TIX: u8 = 0x2C;
/// Jump if equal.
pub const JEQ: u8 = 0x30;
/// Jump if greater.
pub const JGT: u8 = 0x34;
/// Jump if less.
pub const JLT: u8 = 0x38;
/// Unconditional jump.
pub const J: u8 = 0x3C;
/// A <- A & operand.
pub const AND: u8 = 0x40;
/// A <- A | operand.
pub const OR: u8 = 0x44;
/// Jump to subroutine (L <- PC).
pub const JSUB: u8 = 0x48;
/// Return from subroutine (PC <- L).
pub const RSUB: u8 = 0x4C;
/// Load character into the low byte of A.
pub const LDCH: u8 = 0x50;
/// Store the low byte of A.
pub const STCH: u8 = 0x54;
/// Load B.
pub const LDB: u8 = 0x68;
/// Load S.
pub const LDS: u8 = 0x6C;
/// Load T.
pub const LDT: u8 = 0x74;
/// Store B.
pub const STB: u8 = 0x78;
/// Store S.
pub const STS: u8 = 0x7C;
/// Store T.
pub const STT: u8 = 0x84;
/// r2 <- r2 + r1.
pub const ADDR: u8 = 0x90;
/// r2 <- r2 - r1.
pub const SUBR: u8 = 0x94;
/// r2 <- r2 * r1.
pub const MULR: u8 = 0x98;
/// r2 <- r2 / r1.
pub const DIVR: u8 = 0x9C;
/// Compare r1 with r2.
pub const COMPR: u8 = 0xA0;
/// Circular left shift of r1 by n.
pub const SHIFTL: u8 = 0xA4;
/// Arithmetic right shift of r1 by n.
pub const SHIFTR: u8 = 0xA8;
/// r2 <- r1.
pub const RMO: u8 = 0xAC;
/// Supervisor call.
pub const SVC: u8 = 0xB0;
/// r1 <- 0.
pub const CLEAR: u8 = 0xB4;
/// Increment X and compare with r1.
pub const TIXR: u8 = 0xB8;
/// F <- A converted to floating point.
pub const FLOAT: u8 = 0xC0;
/// A <- F truncated to an integer.
pub const FIX: u8 = 0xC4;
/// Normalize F.
pub const NORM: u8 = 0xC8;
/// Test device.
pub const TD: u8 = 0xE0;
/// Read one byte from a device into A.
pub const RD: u8 = 0xD8;
/// Write the low byte of A to a device.
pub const WD: u8 = 0xDC;
/// Store SW.
pub const STSW: u8 = 0xE8;
/// Start I/O channel.
pub const SIO: u8 = 0xF0;
/// Halt I/O channel.
pub const HIO: u8 = 0xF4;
/// Test I/O channel.
pub const TIO: u8 = 0xF8;
