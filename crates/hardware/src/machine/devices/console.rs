//! Console devices.
//!
//! Devices `00`, `01`, and `02` (aliases `STDIN`, `STDOUT`, `STDERR`) map to the host
//! process streams. They always test ready.

use std::io::{self, Read, Write};

use crate::machine::traits::Device;

/// Host stream behind a console device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleStream {
    /// Standard input (`00`).
    Stdin,
    /// Standard output (`01`).
    Stdout,
    /// Standard error (`02`).
    Stderr,
}

impl ConsoleStream {
    /// Resolves a device name or alias (case-insensitive) to a console stream.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "00" | "STDIN" => Some(Self::Stdin),
            "01" | "STDOUT" => Some(Self::Stdout),
            "02" | "STDERR" => Some(Self::Stderr),
            _ => None,
        }
    }

    /// Canonical two-hex-digit identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Stdin => "00",
            Self::Stdout => "01",
            Self::Stderr => "02",
        }
    }
}

/// Console device bound to one host stream.
#[derive(Debug)]
pub struct Console {
    stream: ConsoleStream,
}

impl Console {
    /// Creates a console device for `stream`.
    pub const fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }
}

impl Device for Console {
    fn name(&self) -> &str {
        self.stream.id()
    }

    fn is_ready(&mut self) -> bool {
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.stream != ConsoleStream::Stdin {
            tracing::warn!(device = self.stream.id(), "read from output console ignored");
            return 0;
        }
        io::stdin().lock().read(buf).unwrap_or_else(|e| {
            tracing::warn!(device = "00", error = %e, "console read failed");
            0
        })
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let result = match self.stream {
            ConsoleStream::Stdin => {
                tracing::warn!(device = "00", "write to input console ignored");
                return 0;
            }
            ConsoleStream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(data).and_then(|()| out.flush())
            }
            ConsoleStream::Stderr => io::stderr().lock().write_all(data),
        };
        match result {
            Ok(()) => data.len(),
            Err(e) => {
                tracing::warn!(device = self.stream.id(), error = %e, "console write failed");
                0
            }
        }
    }
}
