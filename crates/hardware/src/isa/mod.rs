//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the SIC/XE opcodes, instruction formats, addressing flags, the opcode
//! lookup table, and a disassembler.

/// Opcode table and instruction length decoding.
pub mod decode;

/// Instruction disassembler for traces and listings.
pub mod disasm;

/// Instruction formats, nixbpe flags, and field extraction.
pub mod instruction;

/// Operation codes.
pub mod opcodes;
