//! Core data types shared by the driver and the CLI
//!
//! - Timing: bus settle delay and reset pulse timing
//! - InterruptMode: what an enabled input pin is compared against
//! - RegisterDump: snapshot of all eleven registers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::protocol::{IoCon, Register};

/// Default delay before every register transaction (milliseconds)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2;

/// Default time RESET is held low (milliseconds)
pub const DEFAULT_RESET_HOLD_MS: u64 = 1;

/// Default settling time around each RESET transition (milliseconds)
pub const DEFAULT_RESET_SETTLE_MS: u64 = 5;

/// Bus and reset timing for one device handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Sleep before each register read or write
    pub settle_delay: Duration,
    /// Time RESET is held low
    pub reset_hold: Duration,
    /// Sleep after each RESET transition
    pub reset_settle: Duration,
}

impl Timing {
    /// No delays at all (simulated buses, tests)
    pub const fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            reset_hold: Duration::ZERO,
            reset_settle: Duration::ZERO,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            reset_hold: Duration::from_millis(DEFAULT_RESET_HOLD_MS),
            reset_settle: Duration::from_millis(DEFAULT_RESET_SETTLE_MS),
        }
    }
}

/// Interrupt-on-change comparison source (INTCON bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterruptMode {
    /// Interrupt when the pin differs from its previous value (INTCON = 0)
    AnyChange,
    /// Interrupt when the pin differs from DEFVAL (INTCON = 1)
    CompareDefault,
}

/// Snapshot of every MCP23008 register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDump {
    pub iodir: u8,
    pub ipol: u8,
    pub gpinten: u8,
    pub defval: u8,
    pub intcon: u8,
    pub iocon: u8,
    pub gppu: u8,
    pub intf: u8,
    pub intcap: u8,
    pub gpio: u8,
    pub olat: u8,
}

impl RegisterDump {
    /// Build a dump from register values in address order
    pub fn from_bytes(bytes: [u8; 11]) -> Self {
        Self {
            iodir: bytes[0],
            ipol: bytes[1],
            gpinten: bytes[2],
            defval: bytes[3],
            intcon: bytes[4],
            iocon: bytes[5],
            gppu: bytes[6],
            intf: bytes[7],
            intcap: bytes[8],
            gpio: bytes[9],
            olat: bytes[10],
        }
    }

    /// Value of a single register
    pub fn get(&self, reg: Register) -> u8 {
        match reg {
            Register::IoDir => self.iodir,
            Register::IPol => self.ipol,
            Register::GpIntEn => self.gpinten,
            Register::DefVal => self.defval,
            Register::IntCon => self.intcon,
            Register::IoCon => self.iocon,
            Register::Gppu => self.gppu,
            Register::IntF => self.intf,
            Register::IntCap => self.intcap,
            Register::Gpio => self.gpio,
            Register::OLat => self.olat,
        }
    }

    /// Decoded IOCON
    pub fn device_config(&self) -> IoCon {
        IoCon::from_byte(self.iocon)
    }
}

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reg in Register::ALL {
            let value = self.get(reg);
            writeln!(
                f,
                "0x{:02X} {:<8} 0x{:02X} 0b{:08b}",
                reg.to_byte(),
                reg.name(),
                value,
                value
            )?;
        }
        Ok(())
    }
}
