//! Decode/Execute Engine.
//!
//! This module defines the `Cpu`, which executes one instruction at a time against a
//! [`MachineState`](crate::machine::MachineState). It coordinates the following:
//! 1. **Fetch and Length:** Reads the opcode, decides the format, and fetches the full instruction.
//! 2. **Addressing:** Resolves immediate, simple, indirect, relative, and indexed operands.
//! 3. **Dispatch:** Runs the handler selected by the opcode table.
//! 4. **Reporting:** Produces an [`Execution`] with the next PC or a halt, a diagnostic,
//!    and the last effective address.
//!
//! The engine never panics on guest faults; every fault becomes an error halt.

/// Target address calculation.
pub mod addressing;

/// Instruction handlers.
pub mod execution;

use std::fmt;

pub use addressing::{AddressMode, DecodedAddressing, Relative, Target};

use crate::common::error::ExecError;

/// How execution stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// The program returned control to its caller.
    Normal,
    /// A fault stopped execution.
    Error(ExecError),
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("NORMAL_HALT"),
            Self::Error(e) => write!(f, "ERROR_HALT: {e}"),
        }
    }
}

/// Result of executing one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Continue at this address.
    Next(u32),
    /// Stop.
    Halt(Halt),
}

/// Record of one executed (or attempted) instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    /// Address the instruction was fetched from.
    pub pc: u32,
    /// Instruction bytes that were fetched.
    pub bytes: Vec<u8>,
    /// Mnemonic, or `"???"` if the opcode was not decoded.
    pub mnemonic: &'static str,
    /// Operand addressing, when it was resolved.
    pub addressing: Option<DecodedAddressing>,
    /// Effective address of a memory operand; `None` for immediate and register operands.
    pub effective_address: Option<u32>,
    /// Description of what the instruction did.
    pub detail: String,
    /// Next PC or halt.
    pub outcome: Outcome,
}

impl Execution {
    fn new(pc: u32) -> Self {
        Self {
            pc,
            bytes: Vec::new(),
            mnemonic: "???",
            addressing: None,
            effective_address: None,
            detail: String::new(),
            outcome: Outcome::Halt(Halt::Normal),
        }
    }

    /// Next PC, if execution continues.
    pub const fn next_pc(&self) -> Option<u32> {
        match self.outcome {
            Outcome::Next(pc) => Some(pc),
            Outcome::Halt(_) => None,
        }
    }

    /// The halt, if execution stopped.
    pub const fn halt(&self) -> Option<&Halt> {
        match &self.outcome {
            Outcome::Next(_) => None,
            Outcome::Halt(halt) => Some(halt),
        }
    }
}

/// The decode/execute engine.
#[derive(Clone, Debug, Default)]
pub struct Cpu {
    /// Emit per-instruction events at `info` instead of `debug`.
    pub trace: bool,
    last_effective_address: Option<u32>,
}

impl Cpu {
    /// Creates an engine.
    pub fn new(trace: bool) -> Self {
        Self {
            trace,
            last_effective_address: None,
        }
    }

    /// Effective address computed by the most recent target address calculation.
    ///
    /// `None` after an immediate operand, a register instruction, or before any instruction.
    pub const fn last_effective_address(&self) -> Option<u32> {
        self.last_effective_address
    }
}
