//! Execution Controller.
//!
//! The `Simulator` owns the machine state and the engine side by side. It:
//! 1. **Initializes:** Loads an object program and sets PC to its entry point.
//! 2. **Steps:** Bounds-checks PC against the loaded program, runs one instruction,
//!    and applies the next PC or records the halt.
//! 3. **Runs:** Steps until a halt or the configured iteration ceiling.
//! 4. **Logs:** Keeps one text entry per executed instruction.

use std::fmt;
use std::path::Path;

use crate::common::constants::WORD_MASK;
use crate::common::error::{ExecError, LoadError};
use crate::common::reg::Register;
use crate::config::Config;
use crate::core::{Cpu, Execution, Halt, Outcome};
use crate::isa::disasm::disassemble;
use crate::machine::devices::DeviceBus;
use crate::machine::MachineState;
use crate::sim::loader::{LoadReport, Loader};

/// Why a run stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// No program was ready to run.
    NotReady,
    /// The program halted normally.
    Normal,
    /// Execution stopped on a fault.
    Error(ExecError),
    /// The iteration ceiling was reached.
    StepLimit(u64),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => f.write_str("not ready"),
            Self::Normal => f.write_str("NORMAL_HALT"),
            Self::Error(e) => write!(f, "ERROR_HALT: {e}"),
            Self::StepLimit(n) => write!(f, "stopped after {n} steps without halting"),
        }
    }
}

/// Result of [`Simulator::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed by this run.
    pub steps: u64,
    /// Why the run stopped.
    pub stop: StopReason,
}

/// Top-level simulator: machine state, engine, and execution log.
#[derive(Debug)]
pub struct Simulator {
    /// Registers, memory, and devices.
    pub state: MachineState,
    /// Decode/execute engine.
    pub cpu: Cpu,
    loader: Loader,
    max_steps: u64,
    ready: bool,
    steps: u64,
    return_address: Option<u32>,
    log: Vec<String>,
    last_execution: Option<Execution>,
    stop: Option<StopReason>,
}

impl Simulator {
    /// Creates a simulator from a configuration.
    pub fn new(config: &Config) -> Self {
        let state = MachineState::with_devices(DeviceBus::new(config.devices.root.clone()));
        Self::with_state(state, config)
    }

    /// Creates a simulator around an existing machine state.
    pub fn with_state(state: MachineState, config: &Config) -> Self {
        Self {
            state,
            cpu: Cpu::new(config.general.trace_instructions),
            loader: Loader::new(config.loader.load_address),
            max_steps: config.general.max_steps,
            ready: false,
            steps: 0,
            return_address: None,
            log: Vec::new(),
            last_execution: None,
            stop: None,
        }
    }

    /// Loads an object file and initializes execution.
    ///
    /// # Returns
    ///
    /// The load report; a missing header is added to its diagnostics. Only an unreadable
    /// file is an error.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport, LoadError> {
        let report = self.loader.load_file(path, &mut self.state)?;
        Ok(self.after_load(report))
    }

    /// Loads an object program from text and initializes execution.
    pub fn load_str(&mut self, text: &str) -> LoadReport {
        let report = self.loader.load_str(text, &mut self.state);
        self.after_load(report)
    }

    fn after_load(&mut self, mut report: LoadReport) -> LoadReport {
        if let Err(e) = self.program_loaded() {
            report.diagnostics.push(e);
        }
        report
    }

    /// Prepares execution of the program described by the machine state metadata.
    ///
    /// Sets PC to the entry point, clears the log, and marks the simulator ready. The
    /// program is entered as if called by JSUB from the address just past its last byte:
    /// `L` holds that return address, and reaching it (through RSUB or an indirect jump
    /// through a saved copy of `L`) is a normal halt.
    ///
    /// # Returns
    ///
    /// `LoadError::NoProgram` if no header record named a program.
    pub fn program_loaded(&mut self) -> Result<(), LoadError> {
        self.log.clear();
        self.steps = 0;
        self.last_execution = None;
        self.stop = None;
        self.return_address = None;

        let program = self.state.program().clone();
        if !program.is_loaded() {
            self.ready = false;
            return Err(LoadError::NoProgram);
        }

        let return_address = program.end() & WORD_MASK;
        self.state.set_pc(program.entry_point);
        self.state.set_reg(Register::L, return_address);
        self.return_address = Some(return_address);
        self.ready = true;
        self.log.push(format!(
            "Program {} loaded at {:06X}, length {:06X}, entry {:06X}",
            program.name, program.load_address, program.total_length, program.entry_point
        ));
        tracing::info!(program = %program.name, entry = program.entry_point, "ready to run");
        Ok(())
    }

    /// Executes one instruction.
    ///
    /// # Returns
    ///
    /// `true` if execution may continue.
    pub fn step(&mut self) -> bool {
        if !self.ready {
            return false;
        }

        let program = self.state.program();
        if program.total_length == 0 {
            self.halt(Halt::Error(ExecError::EmptyProgram));
            return false;
        }
        let pc = self.state.pc();
        if self.return_address == Some(pc) && !program.contains(pc) {
            self.log.push(format!("Returned to caller at {pc:06X}"));
            self.halt(Halt::Normal);
            return false;
        }
        if !program.contains(pc) {
            let error = ExecError::OutsideProgram {
                pc,
                start: program.load_address,
                end: program.end(),
            };
            self.halt(Halt::Error(error));
            return false;
        }

        let execution = self.cpu.execute_at(&mut self.state, pc);
        let text = disassemble(&execution.bytes);
        let result = match &execution.outcome {
            Outcome::Next(next) => {
                self.steps += 1;
                self.log.push(format!(
                    "PC {pc:06X}: {text:<20} {}; next PC {next:06X}",
                    execution.detail
                ));
                self.state.set_pc(*next);
                None
            }
            Outcome::Halt(halt) => {
                if *halt == Halt::Normal {
                    self.steps += 1;
                }
                self.log.push(format!("PC {pc:06X}: {text:<20} {}", execution.detail));
                Some(halt.clone())
            }
        };
        self.last_execution = Some(execution);

        match result {
            None => true,
            Some(halt) => {
                self.halt(halt);
                false
            }
        }
    }

    fn halt(&mut self, halt: Halt) {
        match &halt {
            Halt::Normal => tracing::info!(steps = self.steps, "normal halt"),
            Halt::Error(e) => tracing::warn!(steps = self.steps, "error halt: {e}"),
        }
        self.log.push(halt.to_string());
        self.stop = Some(match halt {
            Halt::Normal => StopReason::Normal,
            Halt::Error(e) => StopReason::Error(e),
        });
        self.ready = false;
    }

    /// Steps until a halt or the iteration ceiling.
    pub fn run(&mut self) -> RunSummary {
        if !self.ready {
            return RunSummary {
                steps: 0,
                stop: self.stop.clone().unwrap_or(StopReason::NotReady),
            };
        }

        let start = self.steps;
        for _ in 0..self.max_steps {
            if !self.step() {
                return RunSummary {
                    steps: self.steps - start,
                    stop: self.stop.clone().unwrap_or(StopReason::NotReady),
                };
            }
        }

        let stop = StopReason::StepLimit(self.max_steps);
        tracing::warn!(limit = self.max_steps, "step limit reached");
        self.log.push(stop.to_string());
        self.stop = Some(stop.clone());
        self.ready = false;
        RunSummary {
            steps: self.steps - start,
            stop,
        }
    }

    /// Address whose arrival ends the program normally.
    pub const fn return_address(&self) -> Option<u32> {
        self.return_address
    }

    /// Returns `true` if `step` would execute an instruction.
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Instructions executed since the program was loaded.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Execution log, oldest first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// The most recent execution record.
    pub const fn last_execution(&self) -> Option<&Execution> {
        self.last_execution.as_ref()
    }

    /// Why execution stopped, once it has.
    pub const fn stop_reason(&self) -> Option<&StopReason> {
        self.stop.as_ref()
    }

    /// Sets the iteration ceiling for `run`.
    pub fn set_max_steps(&mut self, max_steps: u64) {
        self.max_steps = max_steps;
    }
}
