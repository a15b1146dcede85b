//! Common utilities and types used throughout the SIC/XE simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Constants:** Memory size, word width, and condition-code encodings.
//! 2. **Word Codec:** Big-endian conversion between byte fields and 24-bit words.
//! 3. **Error Handling:** Structured execution, loader, and configuration errors.
//! 4. **Register Management:** The nine architectural registers with 24-bit masking.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for execution, loading, and configuration.
pub mod error;

/// Register file implementation.
pub mod reg;

/// Big-endian word codec and sign extension.
pub mod word;

pub use constants::{ConditionCode, MEMORY_SIZE, WORD_MASK};
pub use error::{ConfigError, ExecError, LoadError};
pub use reg::{Register, RegisterFile};
pub use word::{bytes_to_signed_int, int_to_bytes, sign_extend, sign_extend_24};
