//! Program loading and execution control.
//!
//! Provides the object record parser, the two-phase relocating loader, and the
//! `Simulator` that drives the engine over a loaded program.

/// Relocating object program loader.
pub mod loader;

/// Object record parsing.
pub mod record;

/// Execution controller.
pub mod simulator;
