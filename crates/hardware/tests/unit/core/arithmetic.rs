//! # Arithmetic and Comparison Tests
//!
//! Arithmetic uses a wide intermediate and masks the result to 24 bits; comparisons
//! are signed.

use crate::common::builder::instruction::{direct, immediate};
use crate::common::harness::{create_test_machine, execute};
use rstest::rstest;
use sicsim_core::common::reg::Register;
use sicsim_core::common::{ConditionCode, ExecError};
use sicsim_core::core::Halt;
use sicsim_core::isa::opcodes::*;

fn run_on_a(opcode: u8, a: u32, operand: i32) -> u32 {
    let (mut cpu, mut state) = create_test_machine(0, &immediate(opcode, operand));
    state.set_reg(Register::A, a);
    let exec = execute(&mut cpu, &mut state);
    assert_eq!(exec.next_pc(), Some(3), "{}", exec.detail);
    state.reg(Register::A)
}

#[rstest]
#[case(ADD, 5, 3, 8)]
#[case(ADD, 0x7F_FFFF, 1, 0x80_0000)]
#[case(ADD, 0xFF_FFFF, 1, 0)]
#[case(SUB, 1, 2, 0xFF_FFFF)]
#[case(SUB, 10, 4, 6)]
#[case(MUL, 0x10_0000, 0x10, 0)]
#[case(MUL, 0xFF_FFFE, 3, 0xFF_FFFA)]
#[case(DIV, 0xFF_FFF9, 2, 0xFF_FFFD)]
#[case(DIV, 100, 7, 14)]
#[case(AND, 0xF0_F0F0, 0xFF, 0xF0)]
#[case(OR, 0x12_0000, 0x34, 0x12_0034)]
fn test_accumulator_arithmetic(#[case] opcode: u8, #[case] a: u32, #[case] operand: i32, #[case] expected: u32) {
    assert_eq!(run_on_a(opcode, a, operand), expected);
}

#[test]
fn test_memory_operand() {
    let (mut cpu, mut state) = create_test_machine(0, &direct(ADD, 0x100));
    state.set_reg(Register::A, 10);
    assert!(state.write_word(0x100, -15));
    let _ = execute(&mut cpu, &mut state);
    assert_eq!(state.get_register_signed(Register::A.index()), -5);
}

#[test]
fn test_division_by_zero_halts_and_keeps_a() {
    let (mut cpu, mut state) = create_test_machine(0, &direct(DIV, 0x100));
    state.set_reg(Register::A, 42);

    let exec = execute(&mut cpu, &mut state);

    assert_eq!(
        exec.halt(),
        Some(&Halt::Error(ExecError::DivisionByZero { mnemonic: "DIV" }))
    );
    assert_eq!(state.reg(Register::A), 42);
    assert_eq!(state.pc(), 0);
}

#[rstest]
#[case(5, 3, ConditionCode::Greater)]
#[case(3, 3, ConditionCode::Equal)]
#[case(0xFF_FFFF, 1, ConditionCode::Less)]
#[case(1, -1, ConditionCode::Greater)]
fn test_comp_is_signed(#[case] a: u32, #[case] operand: i32, #[case] expected: ConditionCode) {
    let (mut cpu, mut state) = create_test_machine(0, &direct(COMP, 0x100));
    state.set_reg(Register::A, a);
    assert!(state.write_word(0x100, operand));

    let _ = execute(&mut cpu, &mut state);

    assert_eq!(state.condition(), Some(expected));
    assert_eq!(state.reg(Register::SW), expected as u32);
}

#[test]
fn test_tix_increments_then_compares() {
    let (mut cpu, mut state) = create_test_machine(0, &direct(TIX, 0x100));
    state.set_reg(Register::X, 4);
    assert!(state.write_word(0x100, 5));

    let _ = execute(&mut cpu, &mut state);
    assert_eq!(state.reg(Register::X), 5);
    assert_eq!(state.condition(), Some(ConditionCode::Equal));

    state.set_pc(0);
    let _ = execute(&mut cpu, &mut state);
    assert_eq!(state.reg(Register::X), 6);
    assert_eq!(state.condition(), Some(ConditionCode::Greater));
}

#[test]
fn test_tix_accepts_immediate() {
    let (mut cpu, mut state) = create_test_machine(0, &immediate(TIX, 10));
    let _ = execute(&mut cpu, &mut state);
    assert_eq!(state.reg(Register::X), 1);
    assert_eq!(state.condition(), Some(ConditionCode::Less));
}
