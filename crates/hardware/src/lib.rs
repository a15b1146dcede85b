//! SIC/XE system simulator library.
//!
//! This crate implements an instruction-level SIC/XE simulator with the following:
//! 1. **Machine:** 24-bit registers, the `F` accumulator, 64 KiB of memory, and named devices.
//! 2. **ISA:** Formats 1-4, nixbpe addressing, an opcode table, and a disassembler.
//! 3. **Core:** The decode/execute engine producing a next PC or a halt per instruction.
//! 4. **Simulation:** A relocating multi-section object loader and the execution controller.
//!
//! # Examples
//!
//! ```
//! use sicsim_core::{Config, Simulator};
//! use sicsim_core::sim::simulator::StopReason;
//!
//! let mut sim = Simulator::new(&Config::default());
//! let report = sim.load_str("HDEMO  00000000000C\nT0000000C0100050F00094F0000000000\nE000000");
//! assert!(report.is_clean());
//! let summary = sim.run();
//! assert_eq!(summary.stop, StopReason::Normal);
//! assert_eq!(sim.state.read_word(9), Some(5));
//! ```

/// Common types and constants (word codec, registers, errors).
pub mod common;
/// Simulator configuration.
pub mod config;
/// Decode/execute engine.
pub mod core;
/// Instruction set (opcodes, formats, decode table, disassembler).
pub mod isa;
/// Machine state store (registers, memory, devices).
pub mod machine;
/// Object loader and execution controller.
pub mod sim;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Decode/execute engine.
pub use crate::core::Cpu;
/// Registers, memory, and devices of one machine.
pub use crate::machine::MachineState;
/// Object program loader.
pub use crate::sim::loader::Loader;
/// Execution controller owning the machine state and engine.
pub use crate::sim::simulator::Simulator;
