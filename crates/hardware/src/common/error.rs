//! Error definitions.
//!
//! This module defines the error types for the simulator. It provides:
//! 1. **Execution Errors:** Faults raised by the decode/execute engine; each one ends
//!    execution with an error halt.
//! 2. **Load Errors:** Malformed or unresolvable object records, reported and skipped.
//! 3. **Configuration Errors:** Failures reading or parsing a JSON configuration.
//!
//! Errors carry structured context and are only formatted when displayed.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Faults raised while decoding or executing an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExecError {
    /// The program counter does not address backed memory.
    #[error("PC 0x{pc:06X} is outside memory")]
    PcOutOfMemory {
        /// Faulting program counter.
        pc: u32,
    },

    /// The instruction runs past the end of memory.
    #[error("instruction at 0x{pc:06X} needs {needed} bytes but memory ends first")]
    TruncatedInstruction {
        /// Address of the opcode byte.
        pc: u32,
        /// Bytes the instruction requires.
        needed: usize,
    },

    /// No operation is assigned to the opcode.
    #[error("unknown opcode 0x{opcode:02X} at 0x{pc:06X}")]
    UnknownOpcode {
        /// Opcode with the n/i bits cleared.
        opcode: u8,
        /// Address of the opcode byte.
        pc: u32,
    },

    /// An operand read or store touched memory outside the backing array.
    #[error("{mnemonic}: memory access at 0x{address:06X} is out of bounds")]
    MemoryOutOfBounds {
        /// Instruction mnemonic.
        mnemonic: &'static str,
        /// Effective address of the access.
        address: u32,
    },

    /// The pointer of an indirect operand lies outside memory.
    #[error("indirect pointer at 0x{pointer:06X} is out of bounds")]
    IndirectOutOfBounds {
        /// Address the pointer was to be read from.
        pointer: u32,
    },

    /// Immediate addressing used on an instruction that needs a memory operand.
    #[error("{mnemonic} does not accept immediate addressing")]
    ImmediateNotAllowed {
        /// Instruction mnemonic.
        mnemonic: &'static str,
    },

    /// Division with a zero divisor.
    #[error("{mnemonic}: division by zero")]
    DivisionByZero {
        /// Instruction mnemonic.
        mnemonic: &'static str,
    },

    /// The instruction decodes but the simulator does not model it.
    #[error("{mnemonic} is not supported")]
    Unsupported {
        /// Instruction mnemonic.
        mnemonic: &'static str,
    },

    /// The program counter left the loaded program.
    #[error("PC 0x{pc:06X} is outside the program range [0x{start:06X}, 0x{end:06X})")]
    OutsideProgram {
        /// Faulting program counter.
        pc: u32,
        /// First address of the program.
        start: u32,
        /// One past the last address of the program.
        end: u32,
    },

    /// The loaded program declares no bytes.
    #[error("program has zero length")]
    EmptyProgram,
}

/// Problems found while loading an object program.
///
/// All variants except [`LoadError::Io`] are recoverable: the loader reports them
/// and continues with the next record or modification.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The object file could not be read.
    #[error("cannot read object file {}: {source}", .path.display())]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A record is shorter than its fixed columns require.
    #[error("line {line}: {kind} record too short ({len} < {min} columns)")]
    RecordTooShort {
        /// 1-based line number.
        line: usize,
        /// Record type character.
        kind: char,
        /// Actual length.
        len: usize,
        /// Required length.
        min: usize,
    },

    /// A hex column did not parse.
    #[error("line {line}: invalid hex in {field}: {text:?}")]
    InvalidHex {
        /// 1-based line number.
        line: usize,
        /// Name of the column.
        field: &'static str,
        /// Offending text.
        text: String,
    },

    /// The record type character is not H, D, R, T, M, or E.
    #[error("line {line}: unknown record type {kind:?}")]
    UnknownRecord {
        /// 1-based line number.
        line: usize,
        /// Record type character.
        kind: char,
    },

    /// A modification record width other than 5 or 6 half-bytes.
    #[error("line {line}: modification width {width} is not 5 or 6")]
    InvalidModificationWidth {
        /// 1-based line number.
        line: usize,
        /// Declared width in half-bytes.
        width: u8,
    },

    /// A modification record operation other than `+` or `-`.
    #[error("line {line}: modification operation {op:?} is not '+' or '-'")]
    InvalidModificationOp {
        /// 1-based line number.
        line: usize,
        /// Operation character.
        op: char,
    },

    /// A modification references a symbol absent from the external symbol table.
    #[error("unresolved external symbol {symbol:?} (modification at 0x{address:06X})")]
    UnresolvedSymbol {
        /// Referenced symbol.
        symbol: String,
        /// Absolute address of the field to modify.
        address: u32,
    },

    /// A symbol was defined twice; the first definition is kept.
    #[error("duplicate external symbol {symbol:?} (kept 0x{kept:06X}, ignored 0x{ignored:06X})")]
    DuplicateSymbol {
        /// Symbol name.
        symbol: String,
        /// Address of the first definition.
        kept: u32,
        /// Address of the rejected definition.
        ignored: u32,
    },

    /// Record bytes or a modified field fall outside memory.
    #[error("{len} byte(s) at 0x{address:06X} fall outside memory")]
    OutOfMemory {
        /// Absolute start address.
        address: u32,
        /// Number of bytes.
        len: usize,
    },

    /// No header record named the program.
    #[error("no program loaded (missing H record)")]
    NoProgram,
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid JSON for [`crate::config::Config`].
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
