//! Machine State Store.
//!
//! This module owns every piece of architectural state. It provides:
//! 1. **Registers:** 24-bit masked general registers, `PC`, `SW`, and the `F` accumulator.
//! 2. **Memory:** A 64 KiB byte array with non-panicking bounds-checked access.
//! 3. **Devices:** The TD/RD/WD entry points and device handle lifecycle.
//! 4. **Program Metadata:** Name, addresses, and length published by the loader.

/// Named byte-stream devices.
pub mod devices;
/// Flat byte memory.
pub mod memory;
/// Device trait.
pub mod traits;

use serde::Serialize;

use crate::common::constants::ConditionCode;
use crate::common::reg::{Register, RegisterFile};
use crate::common::word::{bytes_to_signed_int, int_to_bytes};

pub use devices::DeviceBus;
pub use memory::Memory;
pub use traits::Device;

/// Metadata describing the program currently in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgramInfo {
    /// Name from the first header record.
    pub name: String,
    /// Start address declared by the first header record.
    pub header_address: u32,
    /// Address the first control section was loaded at.
    pub load_address: u32,
    /// Sum of the declared lengths of all control sections.
    pub total_length: u32,
    /// Address of the first instruction to execute.
    pub entry_point: u32,
}

impl ProgramInfo {
    /// One past the last address of the program.
    pub const fn end(&self) -> u32 {
        self.load_address.saturating_add(self.total_length)
    }

    /// Returns `true` if `address` lies inside `[load_address, end)`.
    pub const fn contains(&self, address: u32) -> bool {
        address >= self.load_address && address < self.end()
    }

    /// Returns `true` if a program has been named by a header record.
    pub fn is_loaded(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Serializable view of the registers and program metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Accumulator.
    pub a: u32,
    /// Index register.
    pub x: u32,
    /// Linkage register.
    pub l: u32,
    /// Base register.
    pub b: u32,
    /// Register S.
    pub s: u32,
    /// Register T.
    pub t: u32,
    /// Floating accumulator.
    pub f: f64,
    /// Program counter.
    pub pc: u32,
    /// Raw status word.
    pub sw: u32,
    /// Status word decoded as a condition code.
    pub condition: Option<ConditionCode>,
    /// Most recently accessed device.
    pub last_device: Option<String>,
    /// Program metadata.
    pub program: ProgramInfo,
}

/// Registers, memory, devices, and program metadata of one machine.
#[derive(Debug, Default)]
pub struct MachineState {
    regs: RegisterFile,
    memory: Memory,
    devices: DeviceBus,
    program: ProgramInfo,
}

impl MachineState {
    /// Creates a machine with zeroed state, resolving file devices in the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a machine whose file devices live in `devices`.
    pub fn with_devices(devices: DeviceBus) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    /// Zeroes memory and registers, clears program metadata, and closes devices.
    pub fn reset(&mut self) {
        self.regs = RegisterFile::new();
        self.memory.clear();
        self.program = ProgramInfo::default();
        self.devices.close_all();
    }

    /// Read access to the register file.
    pub const fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Reads a register by hardware number; invalid numbers read as 0.
    pub fn get_register(&self, idx: usize) -> u32 {
        self.regs.read(idx)
    }

    /// Reads a register sign-extended from 24 bits.
    pub fn get_register_signed(&self, idx: usize) -> i32 {
        self.regs.read_signed(idx)
    }

    /// Writes a register by hardware number, masked to 24 bits; invalid numbers are ignored.
    pub fn set_register(&mut self, idx: usize, value: u32) {
        self.regs.write(idx, value);
    }

    /// Reads a named register.
    pub fn reg(&self, reg: Register) -> u32 {
        self.regs.get(reg)
    }

    /// Writes a named register, masked to 24 bits.
    pub fn set_reg(&mut self, reg: Register, value: u32) {
        self.regs.set(reg, value);
    }

    /// Reads the floating accumulator.
    pub const fn get_f(&self) -> f64 {
        self.regs.read_f()
    }

    /// Writes the floating accumulator.
    pub fn set_f(&mut self, value: f64) {
        self.regs.write_f(value);
    }

    /// Returns the program counter.
    pub fn pc(&self) -> u32 {
        self.regs.pc()
    }

    /// Sets the program counter.
    pub fn set_pc(&mut self, pc: u32) {
        self.regs.set_pc(pc);
    }

    /// Sets `SW` to a condition code.
    pub fn set_condition(&mut self, cc: ConditionCode) {
        self.regs.set(Register::SW, cc as u32);
    }

    /// Decodes `SW` as a condition code.
    pub fn condition(&self) -> Option<ConditionCode> {
        ConditionCode::from_raw(self.regs.get(Register::SW))
    }

    /// Read access to memory.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Reads `len` bytes; empty if the range is out of bounds.
    pub fn read_bytes(&self, address: u32, len: usize) -> &[u8] {
        self.memory.read_bytes(address, len)
    }

    /// Writes bytes; out-of-bounds writes are ignored and return `false`.
    pub fn write_bytes(&mut self, address: u32, bytes: &[u8]) -> bool {
        self.memory.write_bytes(address, bytes)
    }

    /// Reads a sign-extended 3-byte word.
    pub fn read_word(&self, address: u32) -> Option<i32> {
        self.memory.read_word(address).map(|w| bytes_to_signed_int(&w))
    }

    /// Writes the low 24 bits of `value` as a 3-byte word.
    pub fn write_word(&mut self, address: u32, value: i32) -> bool {
        self.memory.write_bytes(address, &int_to_bytes(value))
    }

    /// Tests a device.
    pub fn test_device(&mut self, name: &str) -> bool {
        self.devices.test(name)
    }

    /// Reads up to `len` bytes from a device.
    pub fn read_device(&mut self, name: &str, len: usize) -> Vec<u8> {
        self.devices.read(name, len)
    }

    /// Writes bytes to a device; returns the number accepted.
    pub fn write_device(&mut self, name: &str, data: &[u8]) -> usize {
        self.devices.write(name, data)
    }

    /// Registers a device, replacing any device of the same name.
    pub fn attach_device(&mut self, device: Box<dyn Device>) {
        self.devices.attach(device);
    }

    /// Closes every open device.
    pub fn close_all_devices(&mut self) {
        self.devices.close_all();
    }

    /// Name of the most recently accessed device.
    pub fn last_device(&self) -> Option<&str> {
        self.devices.last_accessed()
    }

    /// Program metadata published by the loader.
    pub const fn program(&self) -> &ProgramInfo {
        &self.program
    }

    /// Replaces the program metadata.
    pub fn set_program(&mut self, program: ProgramInfo) {
        self.program = program;
    }

    /// Two hex digits for the byte at `address`, or two spaces outside the program.
    pub fn memory_hex(&self, address: u32) -> String {
        if !self.program.contains(address) {
            return "  ".to_owned();
        }
        self.memory
            .read_u8(address)
            .map_or_else(|| "  ".to_owned(), |b| format!("{b:02X}"))
    }

    /// Captures registers and metadata.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            a: self.reg(Register::A),
            x: self.reg(Register::X),
            l: self.reg(Register::L),
            b: self.reg(Register::B),
            s: self.reg(Register::S),
            t: self.reg(Register::T),
            f: self.get_f(),
            pc: self.pc(),
            sw: self.reg(Register::SW),
            condition: self.condition(),
            last_device: self.last_device().map(str::to_owned),
            program: self.program.clone(),
        }
    }
}
