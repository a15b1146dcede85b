//! Target Address Calculation.
//!
//! Resolves the operand of a format 3/4 instruction from its nixbpe flags:
//! 1. **Immediate** (`i` only): the address field is the operand; memory is not touched.
//! 2. **Relative base:** PC-relative (`p`), base-relative (`b`), or direct.
//! 3. **Indexing** (`x`): adds register X.
//! 4. **Indirection** (`n` only): exactly one extra 3-byte read of the pointer.

use std::fmt;

use super::Cpu;
use crate::common::constants::WORD_MASK;
use crate::common::error::ExecError;
use crate::common::reg::Register;
use crate::common::word::{sign_extend, word_from_bytes};
use crate::isa::instruction::{DISP_BITS, InstructionBits};
use crate::machine::MachineState;

/// What the address field is added to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relative {
    /// The field is the address.
    Direct,
    /// Added to the address of the next instruction.
    Pc,
    /// Added to register B.
    Base,
}

/// How a memory operand's address was formed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressMode {
    /// Base of the address computation.
    pub relative: Relative,
    /// Register X was added.
    pub indexed: bool,
    /// The computed address held a pointer to the operand.
    pub indirect: bool,
}

impl fmt::Display for AddressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.indirect { "indirect" } else { "simple" })?;
        match self.relative {
            Relative::Direct => f.write_str(" direct")?,
            Relative::Pc => f.write_str(" PC-relative")?,
            Relative::Base => f.write_str(" base-relative")?,
        }
        if self.indexed {
            f.write_str(" indexed")?;
        }
        Ok(())
    }
}

/// Resolved operand of a format 3/4 instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// The operand value itself.
    Immediate(i32),
    /// Effective address of the operand, after any indirection.
    Memory {
        /// Effective address.
        address: u32,
        /// How the address was formed.
        mode: AddressMode,
    },
}

/// Addressing recorded for an executed instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedAddressing {
    /// Immediate operand; no memory address.
    Immediate(i32),
    /// Memory operand at a resolved effective address.
    Memory {
        /// Effective address.
        address: u32,
        /// How the address was formed.
        mode: AddressMode,
    },
    /// Format 2 register numbers.
    RegisterPair {
        /// First register number.
        r1: u8,
        /// Second register number.
        r2: u8,
    },
}

impl From<Target> for DecodedAddressing {
    fn from(target: Target) -> Self {
        match target {
            Target::Immediate(value) => Self::Immediate(value),
            Target::Memory { address, mode } => Self::Memory { address, mode },
        }
    }
}

impl Cpu {
    /// Calculates the target of a format 3/4 instruction.
    ///
    /// Records the effective address for diagnostics; immediate operands record none.
    ///
    /// # Arguments
    ///
    /// * `state` - Machine state supplying B, X, and the indirect pointer.
    /// * `pc` - Address of the instruction.
    /// * `bytes` - The 3 or 4 instruction bytes.
    ///
    /// # Returns
    ///
    /// The immediate value or the effective address, or `IndirectOutOfBounds` when the
    /// pointer cannot be read.
    pub fn calculate_target_address(
        &mut self,
        state: &MachineState,
        pc: u32,
        bytes: &[u8],
    ) -> Result<Target, ExecError> {
        self.last_effective_address = None;

        let flags = bytes.flags();
        let length: u32 = if flags.e { 4 } else { 3 };
        let field = bytes.address_field();
        let disp = if !flags.e && flags.signed_displacement() {
            i64::from(sign_extend(field, DISP_BITS))
        } else {
            i64::from(field)
        };

        if flags.is_immediate() {
            return Ok(Target::Immediate(disp as i32));
        }

        let relative = match (flags.b, flags.p) {
            (false, true) => Relative::Pc,
            (true, false) => Relative::Base,
            _ => Relative::Direct,
        };
        let mut address = match relative {
            Relative::Pc => i64::from(pc) + i64::from(length) + disp,
            Relative::Base => i64::from(state.reg(Register::B)) + disp,
            Relative::Direct => disp,
        };
        if flags.x {
            address += i64::from(state.reg(Register::X));
        }
        let mut address = (address as u32) & WORD_MASK;

        let indirect = flags.is_indirect();
        if indirect {
            let pointer = state
                .memory()
                .read_word(address)
                .ok_or(ExecError::IndirectOutOfBounds { pointer: address })?;
            address = word_from_bytes(pointer) & WORD_MASK;
        }

        self.last_effective_address = Some(address);
        Ok(Target::Memory {
            address,
            mode: AddressMode {
                relative,
                indexed: flags.x,
                indirect,
            },
        })
    }
}
