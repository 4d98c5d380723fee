//! Error types for the MCP23008 driver and CLI
//!
//! - AppError: Top-level application errors
//! - I2cError: bus transport and device errors
//! - ConfigError: Configuration loading/validation errors (re-exported from config module)
//! - ProtocolError: register addressing errors (re-exported from protocol module)

use std::io;

pub use crate::config::ConfigError;
pub use crate::protocol::ProtocolError;

// ============================================================================
// Top-Level Application Error
// ============================================================================

/// Top-level application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// I2C communication error
    #[error("I2C communication error: {0}")]
    I2c(#[from] I2cError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Discovery scanned the whole address range without an answer
    #[error("No MCP23008 found on I2C bus {bus} (scanned 0x{first:02X}-0x{last:02X})")]
    DeviceNotFound { bus: u8, first: u8, last: u8 },

    /// The sysfs GPIO wired to RESET could not be exported or configured
    #[error("Failed to open reset GPIO {gpio}: {source}")]
    ResetGpio {
        gpio: u32,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// I2C Error
// ============================================================================

/// I2C-specific communication errors
#[derive(Debug, thiserror::Error)]
pub enum I2cError {
    /// Failed to open I2C device
    #[error("Failed to open I2C device {device}: {source}")]
    DeviceOpen {
        device: String,
        #[source]
        source: io::Error,
    },

    /// Read operation failed
    #[error("Failed to read register 0x{register:02X} of device 0x{address:02X}: {source}")]
    ReadFailed {
        address: u8,
        register: u8,
        #[source]
        source: io::Error,
    },

    /// Write operation failed
    #[error("Failed to write register 0x{register:02X} of device 0x{address:02X}: {source}")]
    WriteFailed {
        address: u8,
        register: u8,
        #[source]
        source: io::Error,
    },

    /// Register address outside the chip's map
    #[error("Invalid register address: 0x{0:02X}")]
    InvalidRegister(u8),

    /// Bus address outside 0x20-0x27
    #[error("Invalid MCP23008 address 0x{0:02X} (expected 0x20-0x27)")]
    InvalidAddress(u8),

    /// Driving the RESET line failed
    #[error("Failed to drive reset line: {source}")]
    ResetLine {
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Result Type Aliases
// ============================================================================

/// Result type using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type using I2cError
pub type I2cResult<T> = std::result::Result<T, I2cError>;
