//! SIC/XE Instruction Decoder.
//!
//! This module maps opcodes to their operation, mnemonic, and format through a single
//! lookup table, so that length determination and dispatch cannot disagree. It provides:
//! 1. **Operations:** The `Operation` sum type the execution engine matches on.
//! 2. **Opcode Table:** A 64-entry table indexed by `opcode >> 2`.
//! 3. **Length Decoding:** Instruction length from the first one or two bytes.

use super::instruction::{E_BIT, Format};
use super::opcodes::{self as op, OPCODE_MASK};
use crate::common::reg::Register;

/// Arithmetic operation shared by the memory and register forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Signed division, truncating toward zero.
    Div,
}

/// Condition tested by a jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpCondition {
    /// Always taken.
    Always,
    /// Taken when `SW` is EQ.
    Equal,
    /// Taken when `SW` is LT.
    Less,
    /// Taken when `SW` is GT.
    Greater,
}

/// Semantic class of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Load a 3-byte word into a register.
    Load(Register),
    /// Load one byte into the low byte of A.
    LoadChar,
    /// Store a register as a 3-byte word.
    Store(Register),
    /// Store the low byte of A.
    StoreChar,
    /// A <- A op operand.
    Arith(ArithOp),
    /// A <- A & operand.
    And,
    /// A <- A | operand.
    Or,
    /// Compare A with the operand.
    Comp,
    /// Increment X and compare with the operand.
    Tix,
    /// Conditional or unconditional jump.
    Jump(JumpCondition),
    /// Jump to subroutine.
    Jsub,
    /// Return from subroutine.
    Rsub,
    /// Test device.
    TestDevice,
    /// Read device.
    ReadDevice,
    /// Write device.
    WriteDevice,
    /// r2 <- r2 op r1.
    ArithReg(ArithOp),
    /// Compare r1 with r2.
    CompReg,
    /// Circular left shift.
    ShiftLeft,
    /// Arithmetic right shift.
    ShiftRight,
    /// r2 <- r1.
    Rmo,
    /// r1 <- 0.
    Clear,
    /// Increment X and compare with r1.
    TixReg,
    /// F <- A.
    Float,
    /// A <- F.
    Fix,
    /// Decoded but not modelled (I/O channels, supervisor calls, NORM).
    Unsupported,
}

/// One row of the opcode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpInfo {
    /// Opcode with n and i cleared.
    pub opcode: u8,
    /// Assembler mnemonic.
    pub mnemonic: &'static str,
    /// Format class.
    pub format: Format,
    /// Semantic class.
    pub operation: Operation,
}

const fn row(opcode: u8, mnemonic: &'static str, format: Format, operation: Operation) -> OpInfo {
    OpInfo {
        opcode,
        mnemonic,
        format,
        operation,
    }
}

/// Every opcode the simulator decodes.
pub const OPCODES: [OpInfo; 49] = {
    use self::ArithOp::{Add, Div, Mul, Sub};
    use self::Format::{One, ThreeFour, Two};
    use self::JumpCondition::{Always, Equal, Greater, Less};
    use self::Operation as O;
    [
        row(op::LDA, "LDA", ThreeFour, O::Load(Register::A)),
        row(op::LDX, "LDX", ThreeFour, O::Load(Register::X)),
        row(op::LDL, "LDL", ThreeFour, O::Load(Register::L)),
        row(op::LDB, "LDB", ThreeFour, O::Load(Register::B)),
        row(op::LDS, "LDS", ThreeFour, O::Load(Register::S)),
        row(op::LDT, "LDT", ThreeFour, O::Load(Register::T)),
        row(op::LDCH, "LDCH", ThreeFour, O::LoadChar),
        row(op::STA, "STA", ThreeFour, O::Store(Register::A)),
        row(op::STX, "STX", ThreeFour, O::Store(Register::X)),
        row(op::STL, "STL", ThreeFour, O::Store(Register::L)),
        row(op::STB, "STB", ThreeFour, O::Store(Register::B)),
        row(op::STS, "STS", ThreeFour, O::Store(Register::S)),
        row(op::STT, "STT", ThreeFour, O::Store(Register::T)),
        row(op::STSW, "STSW", ThreeFour, O::Store(Register::SW)),
        row(op::STCH, "STCH", ThreeFour, O::StoreChar),
        row(op::ADD, "ADD", ThreeFour, O::Arith(Add)),
        row(op::SUB, "SUB", ThreeFour, O::Arith(Sub)),
        row(op::MUL, "MUL", ThreeFour, O::Arith(Mul)),
        row(op::DIV, "DIV", ThreeFour, O::Arith(Div)),
        row(op::AND, "AND", ThreeFour, O::And),
        row(op::OR, "OR", ThreeFour, O::Or),
        row(op::COMP, "COMP", ThreeFour, O::Comp),
        row(op::TIX, "TIX", ThreeFour, O::Tix),
        row(op::J, "J", ThreeFour, O::Jump(Always)),
        row(op::JEQ, "JEQ", ThreeFour, O::Jump(Equal)),
        row(op::JLT, "JLT", ThreeFour, O::Jump(Less)),
        row(op::JGT, "JGT", ThreeFour, O::Jump(Greater)),
        row(op::JSUB, "JSUB", ThreeFour, O::Jsub),
        row(op::RSUB, "RSUB", ThreeFour, O::Rsub),
        row(op::TD, "TD", ThreeFour, O::TestDevice),
        row(op::RD, "RD", ThreeFour, O::ReadDevice),
        row(op::WD, "WD", ThreeFour, O::WriteDevice),
        row(op::ADDR, "ADDR", Two, O::ArithReg(Add)),
        row(op::SUBR, "SUBR", Two, O::ArithReg(Sub)),
        row(op::MULR, "MULR", Two, O::ArithReg(Mul)),
        row(op::DIVR, "DIVR", Two, O::ArithReg(Div)),
        row(op::COMPR, "COMPR", Two, O::CompReg),
        row(op::SHIFTL, "SHIFTL", Two, O::ShiftLeft),
        row(op::SHIFTR, "SHIFTR", Two, O::ShiftRight),
        row(op::RMO, "RMO", Two, O::Rmo),
        row(op::CLEAR, "CLEAR", Two, O::Clear),
        row(op::TIXR, "TIXR", Two, O::TixReg),
        row(op::SVC, "SVC", Two, O::Unsupported),
        row(op::FLOAT, "FLOAT", One, O::Float),
        row(op::FIX, "FIX", One, O::Fix),
        row(op::NORM, "NORM", One, O::Unsupported),
        row(op::SIO, "SIO", One, O::Unsupported),
        row(op::HIO, "HIO", One, O::Unsupported),
        row(op::TIO, "TIO", One, O::Unsupported),
    ]
};

const fn build_table() -> [Option<OpInfo>; 64] {
    let mut table = [None; 64];
    let mut idx = 0;
    while idx < OPCODES.len() {
        let info = OPCODES[idx];
        table[(info.opcode >> 2) as usize] = Some(info);
        idx += 1;
    }
    table
}

/// Opcode table indexed by `opcode >> 2`.
pub static OPCODE_TABLE: [Option<OpInfo>; 64] = build_table();

/// Looks up the table row for the first instruction byte (n and i bits are ignored).
#[inline]
pub fn lookup(byte0: u8) -> Option<&'static OpInfo> {
    OPCODE_TABLE[((byte0 & OPCODE_MASK) >> 2) as usize].as_ref()
}

/// Format of the instruction starting with `byte0`.
///
/// Opcodes absent from the table are treated as format 3/4.
pub fn format_of(byte0: u8) -> Format {
    lookup(byte0).map_or(Format::ThreeFour, |info| info.format)
}

/// Length in bytes of the instruction starting with `byte0`.
///
/// # Arguments
///
/// * `byte0` - First instruction byte.
/// * `byte1` - Second instruction byte, if available; needed to read the `e` flag.
///
/// # Returns
///
/// 1, 2, 3, or 4; `None` for a format 3/4 instruction whose second byte is missing.
pub fn instruction_length(byte0: u8, byte1: Option<u8>) -> Option<usize> {
    match format_of(byte0) {
        Format::One => Some(1),
        Format::Two => Some(2),
        Format::ThreeFour => byte1.map(|b| if b & E_BIT != 0 { 4 } else { 3 }),
    }
}
