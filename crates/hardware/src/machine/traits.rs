//! Device trait for byte-stream I/O.
//!
//! This module defines the `Device` trait implemented by every device the TD, RD,
//! and WD instructions can reach. It provides:
//! 1. **Identification:** `name` for the two-hex-digit device identifier.
//! 2. **Readiness:** `is_ready` backing the TD instruction.
//! 3. **Access:** Byte-stream `read` and `write`; short counts signal end of stream or failure.
//!
//! Implementations never panic or return errors for I/O failures; they log them
//! and report zero bytes transferred.

/// Byte-stream device reachable from TD, RD, and WD.
pub trait Device: Send {
    /// Returns the device identifier (e.g., `"01"`, `"F1"`).
    fn name(&self) -> &str;
    /// Returns `true` if the device can currently be read and written.
    fn is_ready(&mut self) -> bool;
    /// Reads up to `buf.len()` bytes; returns how many were read (0 at end of stream).
    fn read(&mut self, buf: &mut [u8]) -> usize;
    /// Writes `data`; returns how many bytes were accepted.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Releases any host resources held by the device.
    fn close(&mut self) {}
}
