use sicsim_core::Simulator;
use sicsim_core::common::reg::Register;
use sicsim_core::config::Config;
use sicsim_core::core::{Cpu, Execution};
use sicsim_core::machine::{Device, MachineState, ProgramInfo};
use sicsim_core::sim::loader::LoadReport;
use sicsim_core::sim::simulator::{RunSummary, StopReason};

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine and state without a loaded program, for single-instruction tests.
pub fn create_test_machine(at: u32, bytes: &[u8]) -> (Cpu, MachineState) {
    init_tracing();
    let mut state = MachineState::new();
    assert!(state.write_bytes(at, bytes));
    state.set_pc(at);
    (Cpu::new(false), state)
}

/// Executes the instruction at PC and applies the next PC.
pub fn execute(cpu: &mut Cpu, state: &mut MachineState) -> Execution {
    let exec = cpu.execute(state);
    if let Some(next) = exec.next_pc() {
        state.set_pc(next);
    }
    exec
}

pub struct TestContext {
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        init_tracing();
        Self {
            sim: Simulator::new(config),
        }
    }

    /// Places raw bytes at `addr` as a single-section program entered at `addr`.
    pub fn load_program(mut self, addr: u32, bytes: &[u8]) -> Self {
        assert!(self.sim.state.write_bytes(addr, bytes));
        self.sim.state.set_program(ProgramInfo {
            name: "TEST".to_owned(),
            header_address: addr,
            load_address: addr,
            total_length: bytes.len() as u32,
            entry_point: addr,
        });
        self.sim.program_loaded().unwrap();
        self
    }

    /// Loads object program text through the loader.
    pub fn load_object(&mut self, text: &str) -> LoadReport {
        self.sim.load_str(text)
    }

    pub fn with_device(mut self, device: Box<dyn Device>) -> Self {
        self.sim.state.attach_device(device);
        self
    }

    pub fn set_reg(&mut self, reg: Register, val: u32) {
        self.sim.state.set_reg(reg, val);
    }

    pub fn get_reg(&self, reg: Register) -> u32 {
        self.sim.state.reg(reg)
    }

    pub fn word(&self, addr: u32) -> i32 {
        self.sim.state.read_word(addr).unwrap()
    }

    pub fn set_word(&mut self, addr: u32, value: i32) {
        assert!(self.sim.state.write_word(addr, value));
    }

    pub fn step(&mut self) -> bool {
        self.sim.step()
    }

    pub fn run(&mut self) -> RunSummary {
        self.sim.run()
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.sim.stop_reason()
    }
}
