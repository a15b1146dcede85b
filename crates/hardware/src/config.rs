//! Configuration system for the SIC/XE simulator.
//!
//! This module defines the configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Step ceiling, load address, and device directory.
//! 2. **Structures:** Sections for general execution, loading, and devices.
//! 3. **Parsing:** JSON input through `serde_json`; every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Iteration ceiling for a single `run()`.
    ///
    /// Guards against programs that never halt; reaching it is an abnormal stop.
    pub const MAX_STEPS: u64 = 100_000;

    /// Address the first control section is loaded at.
    pub const LOAD_ADDRESS: u32 = 0;

    /// Directory in which file devices are resolved.
    pub const DEVICE_ROOT: &str = ".";
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use sicsim_core::config::Config;
///
/// let config = Config::from_json_str(r#"{ "general": { "max_steps": 500 } }"#).unwrap();
/// assert_eq!(config.general.max_steps, 500);
/// assert_eq!(config.loader.load_address, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General execution settings.
    pub general: GeneralConfig,
    /// Loader settings.
    pub loader: LoaderConfig,
    /// Device settings.
    pub devices: DeviceConfig,
}

impl Config {
    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// General execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit one `info`-level event per executed instruction instead of `debug`.
    pub trace_instructions: bool,

    /// Iteration ceiling for `run()`.
    pub max_steps: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            max_steps: defaults::MAX_STEPS,
        }
    }
}

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Address the first control section is placed at.
    pub load_address: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            load_address: defaults::LOAD_ADDRESS,
        }
    }
}

/// Device settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Directory in which file devices are created and opened.
    pub root: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(defaults::DEVICE_ROOT),
        }
    }
}
