//! Instruction Execution.
//!
//! This module implements the per-instruction cycle of the engine. It performs the following:
//! 1. **Fetch:** Reads the opcode byte and the `e` flag, then the whole instruction.
//! 2. **Dispatch:** Matches on the [`Operation`] from the opcode table.
//! 3. **Semantics:** Loads, stores, 24-bit arithmetic, comparisons, jumps, register
//!    operations, and device I/O.
//! 4. **Observability:** Emits one `tracing` event per instruction.

use super::{Cpu, DecodedAddressing, Execution, Halt, Outcome, Target};
use crate::common::constants::{ConditionCode, WORD_MASK};
use crate::common::error::ExecError;
use crate::common::reg::Register;
use crate::common::word::sign_extend_24;
use crate::isa::decode::{ArithOp, JumpCondition, OpInfo, Operation, instruction_length, lookup};
use crate::isa::instruction::InstructionBits;
use crate::isa::opcodes::OPCODE_MASK;
use crate::machine::MachineState;
use crate::machine::devices::device_name;

/// Mask keeping every byte of A except the lowest.
const A_HIGH_BYTES: u32 = 0xFF_FF00;

/// Bit width of a register for shifts.
const WORD_BITS: u32 = 24;

/// Decoded instruction being executed.
struct Context<'a> {
    pc: u32,
    next: u32,
    bytes: &'a [u8],
    info: &'static OpInfo,
}

impl Cpu {
    /// Executes the instruction at the current PC.
    ///
    /// The PC register itself is not advanced; the caller applies [`Execution::next_pc`].
    pub fn execute(&mut self, state: &mut MachineState) -> Execution {
        let pc = state.pc();
        self.execute_at(state, pc)
    }

    /// Executes the instruction at `pc`.
    ///
    /// # Arguments
    ///
    /// * `state` - Machine state to read and mutate.
    /// * `pc` - Address of the instruction.
    ///
    /// # Returns
    ///
    /// The execution record. Faults are reported as [`Halt::Error`], never as panics.
    pub fn execute_at(&mut self, state: &mut MachineState, pc: u32) -> Execution {
        self.last_effective_address = None;
        let mut exec = Execution::new(pc);

        exec.outcome = match self.fetch_and_run(state, pc, &mut exec) {
            Ok(outcome) => outcome,
            Err(e) => {
                if exec.detail.is_empty() {
                    exec.detail = e.to_string();
                }
                Outcome::Halt(Halt::Error(e))
            }
        };
        exec.effective_address = self.last_effective_address;

        if self.trace {
            tracing::info!(pc, mnemonic = exec.mnemonic, detail = %exec.detail, outcome = ?exec.outcome);
        } else {
            tracing::debug!(pc, mnemonic = exec.mnemonic, detail = %exec.detail, outcome = ?exec.outcome);
        }
        exec
    }

    fn fetch_and_run(
        &mut self,
        state: &mut MachineState,
        pc: u32,
        exec: &mut Execution,
    ) -> Result<Outcome, ExecError> {
        let memory = state.memory();
        let b0 = memory
            .read_u8(pc)
            .ok_or(ExecError::PcOutOfMemory { pc })?;
        let length = instruction_length(b0, memory.read_u8(pc.wrapping_add(1)))
            .ok_or(ExecError::TruncatedInstruction { pc, needed: 2 })?;
        let bytes = state.read_bytes(pc, length).to_vec();
        if bytes.len() != length {
            return Err(ExecError::TruncatedInstruction { pc, needed: length });
        }
        exec.bytes.clone_from(&bytes);

        let info = lookup(b0).ok_or(ExecError::UnknownOpcode {
            opcode: b0 & OPCODE_MASK,
            pc,
        })?;
        exec.mnemonic = info.mnemonic;

        let ctx = Context {
            pc,
            next: pc.wrapping_add(length as u32) & WORD_MASK,
            bytes: &bytes,
            info,
        };
        self.dispatch(state, &ctx, exec)
    }

    fn target(
        &mut self,
        state: &MachineState,
        ctx: &Context<'_>,
        exec: &mut Execution,
    ) -> Result<Target, ExecError> {
        let target = self.calculate_target_address(state, ctx.pc, ctx.bytes)?;
        exec.addressing = Some(target.into());
        Ok(target)
    }

    fn registers(ctx: &Context<'_>, exec: &mut Execution) -> (usize, usize) {
        let (r1, r2) = (ctx.bytes.r1(), ctx.bytes.r2());
        exec.addressing = Some(DecodedAddressing::RegisterPair { r1, r2 });
        (usize::from(r1), usize::from(r2))
    }

    fn dispatch(
        &mut self,
        state: &mut MachineState,
        ctx: &Context<'_>,
        exec: &mut Execution,
    ) -> Result<Outcome, ExecError> {
        let mnemonic = ctx.info.mnemonic;
        let next = Outcome::Next(ctx.next);

        match ctx.info.operation {
            Operation::Load(reg) => {
                let target = self.target(state, ctx, exec)?;
                let value = operand_word(state, target, mnemonic)?;
                state.set_reg(reg, value as u32);
                exec.detail = format!("{reg} <- {:06X} ({})", state.reg(reg), describe(target));
                Ok(next)
            }
            Operation::LoadChar => {
                let target = self.target(state, ctx, exec)?;
                let byte = operand_byte(state, target, mnemonic)?;
                let a = (state.reg(Register::A) & A_HIGH_BYTES) | u32::from(byte);
                state.set_reg(Register::A, a);
                exec.detail = format!("A[7:0] <- {byte:02X} ({})", describe(target));
                Ok(next)
            }
            Operation::Store(reg) => {
                let target = self.target(state, ctx, exec)?;
                let address = memory_address(target, mnemonic)?;
                let value = state.reg(reg);
                if !state.write_word(address, value as i32) {
                    return Err(ExecError::MemoryOutOfBounds { mnemonic, address });
                }
                exec.detail = format!("[{address:06X}] <- {reg} ({value:06X})");
                Ok(next)
            }
            Operation::StoreChar => {
                let target = self.target(state, ctx, exec)?;
                let address = memory_address(target, mnemonic)?;
                let byte = state.reg(Register::A) as u8;
                if !state.write_bytes(address, &[byte]) {
                    return Err(ExecError::MemoryOutOfBounds { mnemonic, address });
                }
                exec.detail = format!("[{address:06X}] <- A[7:0] ({byte:02X})");
                Ok(next)
            }
            Operation::Arith(op) => {
                let target = self.target(state, ctx, exec)?;
                let operand = operand_word(state, target, mnemonic)?;
                let a = state.get_register_signed(Register::A.index());
                let result = arith(op, a, operand, mnemonic)?;
                state.set_reg(Register::A, result);
                exec.detail = format!("A <- {:06X} ({a} {} {operand})", state.reg(Register::A), symbol(op));
                Ok(next)
            }
            Operation::And | Operation::Or => {
                let target = self.target(state, ctx, exec)?;
                let operand = operand_word(state, target, mnemonic)? as u32;
                let a = state.reg(Register::A);
                let result = if ctx.info.operation == Operation::And {
                    a & operand
                } else {
                    a | operand
                };
                state.set_reg(Register::A, result);
                exec.detail = format!("A <- {:06X}", state.reg(Register::A));
                Ok(next)
            }
            Operation::Comp => {
                let target = self.target(state, ctx, exec)?;
                let operand = operand_word(state, target, mnemonic)?;
                let a = state.get_register_signed(Register::A.index());
                let cc = ConditionCode::compare(i64::from(a), i64::from(operand));
                state.set_condition(cc);
                exec.detail = format!("compare {a} with {operand}: SW <- {}", cc.as_str());
                Ok(next)
            }
            Operation::Tix => {
                let target = self.target(state, ctx, exec)?;
                let operand = operand_word(state, target, mnemonic)?;
                let x = increment_x(state);
                let cc = ConditionCode::compare(i64::from(x), i64::from(operand));
                state.set_condition(cc);
                exec.detail = format!("X <- {x}, compare with {operand}: SW <- {}", cc.as_str());
                Ok(next)
            }
            Operation::Jump(condition) => {
                let target = self.target(state, ctx, exec)?;
                let address = memory_address(target, mnemonic)?;
                let taken = match condition {
                    JumpCondition::Always => true,
                    JumpCondition::Equal => state.condition() == Some(ConditionCode::Equal),
                    JumpCondition::Less => state.condition() == Some(ConditionCode::Less),
                    JumpCondition::Greater => state.condition() == Some(ConditionCode::Greater),
                };
                if taken {
                    exec.detail = format!("jump to {address:06X}");
                    Ok(Outcome::Next(address))
                } else {
                    exec.detail = format!("not taken (target {address:06X})");
                    Ok(next)
                }
            }
            Operation::Jsub => {
                let target = self.target(state, ctx, exec)?;
                let address = memory_address(target, mnemonic)?;
                state.set_reg(Register::L, ctx.next);
                exec.detail = format!("L <- {:06X}, jump to {address:06X}", ctx.next);
                Ok(Outcome::Next(address))
            }
            Operation::Rsub => {
                let address = state.reg(Register::L) & WORD_MASK;
                let program = state.program();
                if program.is_loaded() && !program.contains(address) {
                    exec.detail = format!("return to {address:06X} outside the program");
                    Ok(Outcome::Halt(Halt::Normal))
                } else {
                    exec.detail = format!("return to {address:06X}");
                    Ok(Outcome::Next(address))
                }
            }
            Operation::TestDevice => {
                let target = self.target(state, ctx, exec)?;
                let device = device_operand(state, target, mnemonic)?;
                let ready = state.test_device(&device);
                let cc = if ready {
                    ConditionCode::Less
                } else {
                    ConditionCode::Equal
                };
                state.set_condition(cc);
                exec.detail = format!(
                    "device {device} {}: SW <- {}",
                    if ready { "ready" } else { "not ready" },
                    cc.as_str()
                );
                Ok(next)
            }
            Operation::ReadDevice => {
                let target = self.target(state, ctx, exec)?;
                let device = device_operand(state, target, mnemonic)?;
                let data = state.read_device(&device, 1);
                let byte = data.first().copied().unwrap_or(0);
                let a = (state.reg(Register::A) & A_HIGH_BYTES) | u32::from(byte);
                state.set_reg(Register::A, a);
                exec.detail = if data.is_empty() {
                    format!("device {device} at end of stream: A[7:0] <- 00")
                } else {
                    format!("A[7:0] <- {byte:02X} from device {device}")
                };
                Ok(next)
            }
            Operation::WriteDevice => {
                let target = self.target(state, ctx, exec)?;
                let device = device_operand(state, target, mnemonic)?;
                let byte = state.reg(Register::A) as u8;
                let written = state.write_device(&device, &[byte]);
                exec.detail = if written == 0 {
                    format!("write of {byte:02X} to device {device} failed")
                } else {
                    format!("A[7:0] ({byte:02X}) -> device {device}")
                };
                Ok(next)
            }
            Operation::ArithReg(op) => {
                let (r1, r2) = Self::registers(ctx, exec);
                let lhs = state.get_register_signed(r2);
                let rhs = state.get_register_signed(r1);
                let result = arith(op, lhs, rhs, mnemonic)?;
                state.set_register(r2, result);
                exec.detail = format!("r{r2} <- {:06X} ({lhs} {} {rhs})", state.get_register(r2), symbol(op));
                Ok(next)
            }
            Operation::CompReg => {
                let (r1, r2) = Self::registers(ctx, exec);
                let lhs = state.get_register_signed(r1);
                let rhs = state.get_register_signed(r2);
                let cc = ConditionCode::compare(i64::from(lhs), i64::from(rhs));
                state.set_condition(cc);
                exec.detail = format!("compare {lhs} with {rhs}: SW <- {}", cc.as_str());
                Ok(next)
            }
            Operation::ShiftLeft => {
                let (r1, r2) = Self::registers(ctx, exec);
                let n = r2 as u32 + 1;
                let value = state.get_register(r1);
                let result = ((value << n) | (value >> (WORD_BITS - n))) & WORD_MASK;
                state.set_register(r1, result);
                exec.detail = format!("r{r1} <- {result:06X}");
                Ok(next)
            }
            Operation::ShiftRight => {
                let (r1, r2) = Self::registers(ctx, exec);
                let n = r2 as u32 + 1;
                let result = (state.get_register_signed(r1) >> n) as u32;
                state.set_register(r1, result);
                exec.detail = format!("r{r1} <- {:06X}", state.get_register(r1));
                Ok(next)
            }
            Operation::Rmo => {
                let (r1, r2) = Self::registers(ctx, exec);
                let value = state.get_register(r1);
                state.set_register(r2, value);
                exec.detail = format!("r{r2} <- r{r1} ({value:06X})");
                Ok(next)
            }
            Operation::Clear => {
                let (r1, _) = Self::registers(ctx, exec);
                state.set_register(r1, 0);
                exec.detail = format!("r{r1} <- 0");
                Ok(next)
            }
            Operation::TixReg => {
                let (r1, _) = Self::registers(ctx, exec);
                let x = increment_x(state);
                let rhs = state.get_register_signed(r1);
                let cc = ConditionCode::compare(i64::from(x), i64::from(rhs));
                state.set_condition(cc);
                exec.detail = format!("X <- {x}, compare with {rhs}: SW <- {}", cc.as_str());
                Ok(next)
            }
            Operation::Float => {
                let a = state.get_register_signed(Register::A.index());
                state.set_f(f64::from(a));
                exec.detail = format!("F <- {a}");
                Ok(next)
            }
            Operation::Fix => {
                let value = state.get_f().trunc() as i64;
                state.set_reg(Register::A, value as u32);
                exec.detail = format!("A <- {:06X}", state.reg(Register::A));
                Ok(next)
            }
            Operation::Unsupported => Err(ExecError::Unsupported { mnemonic }),
        }
    }
}

fn describe(target: Target) -> String {
    match target {
        Target::Immediate(value) => format!("immediate {value}"),
        Target::Memory { address, mode } => format!("{mode} @ {address:06X}"),
    }
}

const fn symbol(op: ArithOp) -> char {
    match op {
        ArithOp::Add => '+',
        ArithOp::Sub => '-',
        ArithOp::Mul => '*',
        ArithOp::Div => '/',
    }
}

/// Applies an arithmetic operation with a wide intermediate, masked to 24 bits.
fn arith(op: ArithOp, lhs: i32, rhs: i32, mnemonic: &'static str) -> Result<u32, ExecError> {
    let (lhs, rhs) = (i64::from(lhs), i64::from(rhs));
    let result = match op {
        ArithOp::Add => lhs + rhs,
        ArithOp::Sub => lhs - rhs,
        ArithOp::Mul => lhs * rhs,
        ArithOp::Div => {
            if rhs == 0 {
                return Err(ExecError::DivisionByZero { mnemonic });
            }
            lhs / rhs
        }
    };
    Ok(result as u32 & WORD_MASK)
}

/// Increments X and returns its new signed value.
fn increment_x(state: &mut MachineState) -> i32 {
    let x = state.reg(Register::X).wrapping_add(1);
    state.set_reg(Register::X, x);
    sign_extend_24(state.reg(Register::X))
}

fn memory_address(target: Target, mnemonic: &'static str) -> Result<u32, ExecError> {
    match target {
        Target::Immediate(_) => Err(ExecError::ImmediateNotAllowed { mnemonic }),
        Target::Memory { address, .. } => Ok(address),
    }
}

fn operand_word(state: &MachineState, target: Target, mnemonic: &'static str) -> Result<i32, ExecError> {
    match target {
        Target::Immediate(value) => Ok(value),
        Target::Memory { address, .. } => state
            .read_word(address)
            .ok_or(ExecError::MemoryOutOfBounds { mnemonic, address }),
    }
}

fn operand_byte(state: &MachineState, target: Target, mnemonic: &'static str) -> Result<u8, ExecError> {
    match target {
        Target::Immediate(value) => Ok(value as u8),
        Target::Memory { address, .. } => state
            .memory()
            .read_u8(address)
            .ok_or(ExecError::MemoryOutOfBounds { mnemonic, address }),
    }
}

fn device_operand(state: &MachineState, target: Target, mnemonic: &'static str) -> Result<String, ExecError> {
    let address = memory_address(target, mnemonic)?;
    state
        .memory()
        .read_u8(address)
        .map(device_name)
        .ok_or(ExecError::MemoryOutOfBounds { mnemonic, address })
}
