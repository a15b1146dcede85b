//! Byte-Addressed Memory.
//!
//! This module provides the flat memory array behind the machine state. Accesses
//! outside the array never panic: reads return an empty slice and writes are ignored,
//! so callers check lengths instead of catching faults.

use crate::common::constants::{MEMORY_SIZE, WORD_BYTES};

/// Flat byte memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(MEMORY_SIZE)
    }
}

impl Memory {
    /// Creates a zero-filled memory of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Returns the size of memory in bytes.
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if memory has no bytes.
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if `[address, address + len)` lies inside memory.
    pub fn contains(&self, address: u32, len: usize) -> bool {
        (address as usize)
            .checked_add(len)
            .is_some_and(|end| end <= self.data.len())
    }

    /// Reads `len` bytes starting at `address`.
    ///
    /// # Arguments
    ///
    /// * `address` - Start address.
    /// * `len` - Number of bytes to read.
    ///
    /// # Returns
    ///
    /// The requested bytes, or an empty slice if any part of the range is out of bounds.
    pub fn read_bytes(&self, address: u32, len: usize) -> &[u8] {
        if self.contains(address, len) {
            let start = address as usize;
            &self.data[start..start + len]
        } else {
            &[]
        }
    }

    /// Writes `bytes` starting at `address`.
    ///
    /// # Returns
    ///
    /// `false` (and memory untouched) if any part of the range is out of bounds.
    pub fn write_bytes(&mut self, address: u32, bytes: &[u8]) -> bool {
        if !self.contains(address, bytes.len()) {
            return false;
        }
        let start = address as usize;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        true
    }

    /// Reads a single byte.
    pub fn read_u8(&self, address: u32) -> Option<u8> {
        self.data.get(address as usize).copied()
    }

    /// Reads a 3-byte word.
    pub fn read_word(&self, address: u32) -> Option<[u8; WORD_BYTES]> {
        let bytes = self.read_bytes(address, WORD_BYTES);
        <[u8; WORD_BYTES]>::try_from(bytes).ok()
    }

    /// Zeroes every byte.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}
