//! Core processor implementation.
//!
//! This module contains the decode/execute engine: target address calculation,
//! the opcode dispatch, and the per-instruction execution record.

/// CPU engine and execution records.
pub mod cpu;

pub use self::cpu::{AddressMode, Cpu, DecodedAddressing, Execution, Halt, Outcome, Relative, Target};
