//! Configuration types and loading for the MCP23008 tools

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::{self, ADDRESS_MAX, ADDRESS_MIN, GPIO_ALL_OUTPUT};
use crate::types::{
    DEFAULT_RESET_HOLD_MS, DEFAULT_RESET_SETTLE_MS, DEFAULT_SETTLE_DELAY_MS, Timing,
};

/// Default configuration file location
pub const DEFAULT_CONFIG_FILE: &str = "/etc/mcp23008/mcp23008.conf";

/// Default I2C bus number (Raspberry Pi I2C bus 1)
pub const DEFAULT_I2C_BUS: u8 = 1;

/// Upper bound for any configured delay in milliseconds
const MAX_DELAY_MS: u64 = 1000;

/// Configuration for one MCP23008 on a Linux I2C bus
///
/// Loaded from YAML and overridden by command-line arguments. Field names
/// with underscores map to dash-separated keys (e.g., `i2c_bus` <-> `i2c-bus`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// I2C bus number
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: u8,

    /// Device address (0x20-0x27)
    ///
    /// If None, the bus is scanned and the first responding chip is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i2c_addr: Option<u8>,

    /// Direction mask programmed by `init` (1 = input)
    #[serde(default = "default_direction")]
    pub direction: u8,

    /// Sysfs GPIO number wired to the chip's RESET input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_gpio: Option<u32>,

    /// Delay before every register transaction
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Time RESET is held low
    #[serde(default = "default_reset_hold_ms")]
    pub reset_hold_ms: u64,

    /// Settling time after each RESET transition
    #[serde(default = "default_reset_settle_ms")]
    pub reset_settle_ms: u64,
}

// Default value functions for serde
fn default_i2c_bus() -> u8 {
    DEFAULT_I2C_BUS
}

fn default_direction() -> u8 {
    GPIO_ALL_OUTPUT
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_reset_hold_ms() -> u64 {
    DEFAULT_RESET_HOLD_MS
}

fn default_reset_settle_ms() -> u64 {
    DEFAULT_RESET_SETTLE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            i2c_bus: DEFAULT_I2C_BUS,
            i2c_addr: None,
            direction: GPIO_ALL_OUTPUT,
            reset_gpio: None,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            reset_hold_ms: DEFAULT_RESET_HOLD_MS,
            reset_settle_ms: DEFAULT_RESET_SETTLE_MS,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.into(), e))?;

        serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::YamlParse(path.into(), e.to_string()))
    }

    /// Load configuration from a file if it exists, otherwise return defaults
    pub fn from_file_or_default(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.i2c_bus > 10 {
            return Err(ConfigError::InvalidValue(format!(
                "i2c-bus {} is unusually high (expected 0-10)",
                self.i2c_bus
            )));
        }

        if let Some(addr) = self.i2c_addr {
            if !protocol::is_valid_address(addr) {
                return Err(ConfigError::InvalidValue(format!(
                    "i2c-addr 0x{:02X} is out of range (expected 0x{:02X}-0x{:02X})",
                    addr, ADDRESS_MIN, ADDRESS_MAX
                )));
            }
        }

        for (key, value) in [
            ("settle-delay-ms", self.settle_delay_ms),
            ("reset-hold-ms", self.reset_hold_ms),
            ("reset-settle-ms", self.reset_settle_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::InvalidValue(format!(
                    "{} {} is too long (expected <= {} ms)",
                    key, value, MAX_DELAY_MS
                )));
            }
        }

        Ok(())
    }

    /// Bus and reset timing derived from the configured delays
    pub fn timing(&self) -> Timing {
        Timing {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            reset_hold: Duration::from_millis(self.reset_hold_ms),
            reset_settle: Duration::from_millis(self.reset_settle_ms),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse YAML config file {0}: {1}")]
    YamlParse(PathBuf, String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
