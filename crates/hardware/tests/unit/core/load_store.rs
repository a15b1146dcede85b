//! # Load and Store Tests

use crate::common::builder::instruction::{InstructionBuilder, direct, extended, immediate};
use crate::common::harness::{create_test_machine, execute};
use rstest::rstest;
use sicsim_core::common::ExecError;
use sicsim_core::common::reg::Register;
use sicsim_core::core::{Halt, Outcome};
use sicsim_core::isa::opcodes::*;

#[rstest]
#[case(LDA, Register::A)]
#[case(LDX, Register::X)]
#[case(LDL, Register::L)]
#[case(LDB, Register::B)]
#[case(LDS, Register::S)]
#[case(LDT, Register::T)]
fn test_loads_move_a_word_into_the_register(#[case] opcode: u8, #[case] reg: Register) {
    let (mut cpu, mut state) = create_test_machine(0, &direct(opcode, 0x100));
    assert!(state.write_bytes(0x100, &[0x12, 0x34, 0x56]));

    let exec = execute(&mut cpu, &mut state);

    assert_eq!(exec.outcome, Outcome::Next(3));
    assert_eq!(state.reg(reg), 0x12_3456);
    assert_eq!(state.pc(), 3);
}

#[rstest]
#[case(STA, Register::A)]
#[case(STX, Register::X)]
#[case(STL, Register::L)]
#[case(STB, Register::B)]
#[case(STS, Register::S)]
#[case(STT, Register::T)]
#[case(STSW, Register::SW)]
fn test_stores_write_the_register_word(#[case] opcode: u8, #[case] reg: Register) {
    let (mut cpu, mut state) = create_test_machine(0, &direct(opcode, 0x100));
    state.set_reg(reg, 0xAB_CDEF);

    let exec = execute(&mut cpu, &mut state);

    assert_eq!(exec.next_pc(), Some(3));
    assert_eq!(state.read_bytes(0x100, 3), &[0xAB, 0xCD, 0xEF]);
}

#[test]
fn test_store_rejects_immediate() {
    let (mut cpu, mut state) = create_test_machine(0, &immediate(STA, 0x100));
    let exec = execute(&mut cpu, &mut state);
    assert_eq!(
        exec.outcome,
        Outcome::Halt(Halt::Error(ExecError::ImmediateNotAllowed { mnemonic: "STA" }))
    );
    assert_eq!(state.pc(), 0);
    assert!(!exec.detail.is_empty());
}

#[test]
fn test_immediate_load() {
    let (mut cpu, mut state) = create_test_machine(0, &immediate(LDT, 4095));
    let _ = execute(&mut cpu, &mut state);
    assert_eq!(state.reg(Register::T), 4095);
}

#[test]
fn test_negative_word_is_masked_into_register() {
    let (mut cpu, mut state) = create_test_machine(0, &direct(LDA, 0x100));
    assert!(state.write_word(0x100, -2));
    let _ = execute(&mut cpu, &mut state);
    assert_eq!(state.reg(Register::A), 0xFF_FFFE);
}

#[test]
fn test_ldch_preserves_high_bytes_of_a() {
    let (mut cpu, mut state) = create_test_machine(0, &direct(LDCH, 0x100));
    state.set_reg(Register::A, 0x12_3456);
    assert!(state.write_bytes(0x100, &[0xAB, 0xCD]));

    let _ = execute(&mut cpu, &mut state);

    assert_eq!(state.reg(Register::A), 0x12_34AB);
}

#[test]
fn test_ldch_indexed_walks_a_string() {
    let bytes = InstructionBuilder::new(LDCH).indexed().field(0x100).build();
    let (mut cpu, mut state) = create_test_machine(0, &bytes);
    assert!(state.write_bytes(0x100, b"EOF"));
    state.set_reg(Register::X, 2);

    let _ = execute(&mut cpu, &mut state);

    assert_eq!(state.reg(Register::A), u32::from(b'F'));
}

#[test]
fn test_stch_writes_one_byte() {
    let (mut cpu, mut state) = create_test_machine(0, &direct(STCH, 0x100));
    state.set_reg(Register::A, 0x12_34AB);

    let _ = execute(&mut cpu, &mut state);

    assert_eq!(state.read_bytes(0x100, 3), &[0xAB, 0x00, 0x00]);
}

#[test]
fn test_store_outside_memory_is_an_error_halt() {
    let (mut cpu, mut state) = create_test_machine(0, &extended(STA, 0xF_FFFF));
    let exec = execute(&mut cpu, &mut state);
    assert_eq!(
        exec.halt(),
        Some(&Halt::Error(ExecError::MemoryOutOfBounds {
            mnemonic: "STA",
            address: 0xF_FFFF,
        }))
    );
}

#[test]
fn test_load_outside_memory_is_an_error_halt() {
    let (mut cpu, mut state) = create_test_machine(0, &extended(LDA, 0x1_0000));
    let exec = execute(&mut cpu, &mut state);
    assert!(matches!(
        exec.halt(),
        Some(Halt::Error(ExecError::MemoryOutOfBounds { mnemonic: "LDA", .. }))
    ));
}

#[test]
fn test_execution_record_describes_the_instruction() {
    let (mut cpu, mut state) = create_test_machine(0x10, &direct(LDA, 0x100));
    let exec = execute(&mut cpu, &mut state);
    assert_eq!(exec.pc, 0x10);
    assert_eq!(exec.mnemonic, "LDA");
    assert_eq!(exec.bytes, direct(LDA, 0x100));
    assert!(exec.detail.contains("000100"), "{}", exec.detail);
}
