//! Device registry.
//!
//! This module routes TD, RD, and WD requests to devices by name. It provides:
//! 1. **Name Resolution:** Console aliases map to `00`/`01`/`02`; every other name is a
//!    file in the device root directory.
//! 2. **Handle Caching:** Each device is created on first use and kept until
//!    [`DeviceBus::close_all`].
//! 3. **Introspection:** The name of the most recently accessed device.

/// Host console streams.
pub mod console;
/// File-backed devices.
pub mod file;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub use console::{Console, ConsoleStream};
pub use file::FileDevice;

use crate::machine::traits::Device;

/// Name-addressed collection of devices.
pub struct DeviceBus {
    root: PathBuf,
    devices: HashMap<String, Box<dyn Device>>,
    last_accessed: Option<String>,
}

impl fmt::Debug for DeviceBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.devices.keys().collect();
        names.sort();
        f.debug_struct("DeviceBus")
            .field("root", &self.root)
            .field("devices", &names)
            .field("last_accessed", &self.last_accessed)
            .finish()
    }
}

impl Default for DeviceBus {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Canonical form of a device name: console aliases become `00`/`01`/`02`, other
/// names are upper-cased.
pub fn canonical_name(name: &str) -> String {
    ConsoleStream::from_name(name).map_or_else(|| name.to_ascii_uppercase(), |s| s.id().to_owned())
}

/// Formats a device identifier byte as two upper-case hex digits.
pub fn device_name(id: u8) -> String {
    format!("{id:02X}")
}

fn open_device(name: &str, root: &Path) -> Box<dyn Device> {
    match ConsoleStream::from_name(name) {
        Some(stream) => Box::new(Console::new(stream)),
        None => Box::new(FileDevice::new(name, root)),
    }
}

impl DeviceBus {
    /// Creates an empty registry resolving file devices inside `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            devices: HashMap::new(),
            last_accessed: None,
        }
    }

    /// Directory in which file devices are resolved.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registers a device under its canonical name, replacing any previous one.
    pub fn attach(&mut self, device: Box<dyn Device>) {
        let name = canonical_name(device.name());
        if let Some(mut old) = self.devices.insert(name, device) {
            old.close();
        }
    }

    fn resolve(&mut self, name: &str) -> &mut Box<dyn Device> {
        let name = canonical_name(name);
        self.last_accessed = Some(name.clone());
        let root = &self.root;
        self.devices
            .entry(name)
            .or_insert_with_key(|key| open_device(key, root))
    }

    /// Tests whether a device is ready. Console aliases are always ready.
    pub fn test(&mut self, name: &str) -> bool {
        self.resolve(name).is_ready()
    }

    /// Reads up to `len` bytes; the result is shorter at end of stream or on failure.
    pub fn read(&mut self, name: &str, len: usize) -> Vec<u8> {
        let mut buf = vec![0; len];
        let n = self.resolve(name).read(&mut buf);
        buf.truncate(n);
        buf
    }

    /// Writes `data`; returns the number of bytes accepted.
    pub fn write(&mut self, name: &str, data: &[u8]) -> usize {
        self.resolve(name).write(data)
    }

    /// Closes and forgets every device.
    pub fn close_all(&mut self) {
        for (_, mut device) in self.devices.drain() {
            device.close();
        }
        self.last_accessed = None;
    }

    /// Name of the most recently accessed device.
    pub fn last_accessed(&self) -> Option<&str> {
        self.last_accessed.as_deref()
    }
}
