//! # Execution Controller Tests

use super::loader::linked_program;
use crate::common::builder::instruction::{InstructionBuilder, direct, immediate, program, rsub};
use crate::common::harness::TestContext;
use pretty_assertions::assert_eq;
use sicsim_core::common::reg::Register;
use sicsim_core::common::{ExecError, LoadError};
use sicsim_core::config::Config;
use sicsim_core::isa::opcodes::*;
use sicsim_core::sim::simulator::{RunSummary, StopReason};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_linked_program_runs_to_normal_halt() {
    let mut ctx = TestContext::new();
    let report = ctx.load_object(&linked_program());
    assert!(report.is_clean(), "{:?}", report.diagnostics);
    assert_eq!(ctx.sim.return_address(), Some(0x16));
    assert_eq!(ctx.get_reg(Register::L), 0x16);

    let summary = ctx.run();

    assert_eq!(
        summary,
        RunSummary {
            steps: 6,
            stop: StopReason::Normal,
        }
    );
    assert_eq!(ctx.get_reg(Register::A), 5);
    assert_eq!(ctx.word(0x0D), 0x16);
    assert!(!ctx.sim.is_ready());
}

#[test]
fn test_rsub_to_caller_halts_normally() {
    let image = program(&[immediate(LDA, 5), rsub()]);
    let mut ctx = TestContext::new().load_program(0, &image);

    assert!(ctx.step());
    assert!(!ctx.step());

    assert_eq!(ctx.stop_reason(), Some(&StopReason::Normal));
    assert_eq!(ctx.sim.steps(), 2);
    assert_eq!(ctx.sim.log().last().map(String::as_str), Some("NORMAL_HALT"));
}

#[test]
fn test_indirect_jump_to_return_address_halts_normally() {
    let image = program(&[
        direct(STL, 6),
        InstructionBuilder::new(J).indirect().field(6).build(),
        vec![0, 0, 0],
    ]);
    let mut ctx = TestContext::new().load_program(0, &image);

    let summary = ctx.run();

    assert_eq!(summary.stop, StopReason::Normal);
    assert_eq!(summary.steps, 2);
    assert!(
        ctx.sim.log().iter().any(|l| l == "Returned to caller at 000009"),
        "{:?}",
        ctx.sim.log()
    );
}

#[test]
fn test_log_lines() {
    let image = program(&[immediate(LDA, 5), rsub()]);
    let mut ctx = TestContext::new().load_program(0, &image);
    let _ = ctx.run();

    let log = ctx.sim.log();
    assert_eq!(log[0], "Program TEST loaded at 000000, length 000006, entry 000000");
    assert!(log[1].starts_with("PC 000000: LDA #5"), "{}", log[1]);
    assert!(log[1].ends_with("; next PC 000003"), "{}", log[1]);
    assert!(log[2].starts_with("PC 000003: RSUB"), "{}", log[2]);
}

#[test]
fn test_step_limit_is_an_abnormal_stop() {
    let image = InstructionBuilder::new(J).pc_relative().field(-3).build();
    let mut ctx = TestContext::new().load_program(0, &image);
    ctx.sim.set_max_steps(10);

    let summary = ctx.run();

    assert_eq!(summary.stop, StopReason::StepLimit(10));
    assert_eq!(summary.steps, 10);
    assert!(!ctx.sim.is_ready());
    assert_eq!(ctx.run().stop, StopReason::StepLimit(10));
}

#[test]
fn test_config_sets_step_limit() {
    let config = Config::from_json_str(r#"{ "general": { "max_steps": 3 } }"#).unwrap();
    let image = InstructionBuilder::new(J).pc_relative().field(-3).build();
    let mut ctx = TestContext::with_config(&config).load_program(0, &image);
    assert_eq!(ctx.run().stop, StopReason::StepLimit(3));
}

#[test]
fn test_leaving_the_program_is_an_error() {
    let mut ctx = TestContext::new().load_program(0, &direct(J, 0x100));

    assert!(ctx.step());
    assert!(!ctx.step());

    assert_eq!(
        ctx.stop_reason(),
        Some(&StopReason::Error(ExecError::OutsideProgram {
            pc: 0x100,
            start: 0,
            end: 3,
        }))
    );
    assert_eq!(ctx.sim.state.pc(), 0x100);
}

#[test]
fn test_error_halt_is_logged() {
    let image = program(&[immediate(LDA, 7), immediate(DIV, 0)]);
    let mut ctx = TestContext::new().load_program(0, &image);

    let summary = ctx.run();

    assert_eq!(summary.stop, StopReason::Error(ExecError::DivisionByZero { mnemonic: "DIV" }));
    assert_eq!(summary.steps, 1);
    assert_eq!(ctx.get_reg(Register::A), 7);
    assert_eq!(ctx.sim.state.pc(), 3);
    assert_eq!(
        ctx.sim.log().last().map(String::as_str),
        Some("ERROR_HALT: DIV: division by zero")
    );
    let last = ctx.sim.last_execution().unwrap();
    assert_eq!(last.mnemonic, "DIV");
}

#[test]
fn test_not_ready_without_program() {
    let mut ctx = TestContext::new();
    assert!(!ctx.step());
    assert_eq!(ctx.run().stop, StopReason::NotReady);
}

#[test]
fn test_missing_header_is_reported() {
    let mut ctx = TestContext::new();
    let report = ctx.load_object("T00000003010005\nE\n");
    assert!(matches!(report.diagnostics.last(), Some(LoadError::NoProgram)));
    assert!(!ctx.sim.is_ready());
}

#[test]
fn test_empty_program_is_an_error() {
    let mut ctx = TestContext::new();
    let _ = ctx.load_object("HEMPTY 000000000000\nE\n");
    assert!(ctx.sim.is_ready());
    assert!(!ctx.step());
    assert_eq!(ctx.stop_reason(), Some(&StopReason::Error(ExecError::EmptyProgram)));
}

#[test]
fn test_reload_starts_over() {
    let mut ctx = TestContext::new();
    let _ = ctx.load_object(&linked_program());
    let _ = ctx.run();

    let _ = ctx.load_object(&linked_program());

    assert!(ctx.sim.is_ready());
    assert_eq!(ctx.sim.steps(), 0);
    assert_eq!(ctx.sim.log().len(), 1);
    assert_eq!(ctx.stop_reason(), None);
    assert_eq!(ctx.get_reg(Register::A), 0);
}

#[test]
fn test_load_file_with_configured_address() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(linked_program().as_bytes()).unwrap();
    file.flush().unwrap();
    let config = Config::from_json_str(r#"{ "loader": { "load_address": 768 } }"#).unwrap();
    let mut ctx = TestContext::with_config(&config);

    let report = ctx.sim.load_file(file.path()).unwrap();

    assert_eq!(report.program.load_address, 0x300);
    assert_eq!(ctx.sim.state.pc(), 0x300);
    // STL and LDL use absolute operands, so RETADR sits below the program.
    let summary = ctx.run();
    assert_eq!(summary.stop, StopReason::Normal);
}

#[test]
fn test_stop_reason_display() {
    assert_eq!(StopReason::Normal.to_string(), "NORMAL_HALT");
    assert_eq!(
        StopReason::Error(ExecError::EmptyProgram).to_string(),
        "ERROR_HALT: program has zero length"
    );
}
