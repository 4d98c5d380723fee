//! Device handle and register access for one MCP23008
//!
//! `Mcp23008` owns a bus handle and the per-chip state:
//! - the bus address (0x20-0x27)
//! - an optional reset line
//! - the last byte written to the output latch (write-owned, informational only)
//! - the last INTCAP/INTF values read (observed, refreshed on demand)
//!
//! Every register transaction is preceded by the configured settle delay.
//! Transactions are not retried; the first failure is returned to the caller.

use mcp23008_common::error::{I2cError, I2cResult};
use mcp23008_common::protocol::{self, ADDRESS_MIN, Register};
use mcp23008_common::types::{RegisterDump, Timing};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

use crate::bus::{Bus, ResetLine};

/// Bus address used until `initialize` or `set_address` says otherwise
pub const DEFAULT_ADDRESS: u8 = ADDRESS_MIN;

/// Handle for a single MCP23008 on a bus
///
/// Operations take `&mut self`: a register read is two bus transactions
/// (pointer write, then data read), so callers sharing one chip must
/// serialize access themselves.
pub struct Mcp23008<B> {
    pub(crate) bus: B,
    address: u8,
    timing: Timing,
    reset_line: Option<Box<dyn ResetLine>>,
    last_output: Option<u8>,
    pub(crate) interrupt_capture: u8,
    pub(crate) interrupt_flags: u8,
}

impl<B: Bus> Mcp23008<B> {
    /// Create a handle with default address and timing, and no reset line
    ///
    /// Nothing is sent to the bus until an operation is called.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            address: DEFAULT_ADDRESS,
            timing: Timing::default(),
            reset_line: None,
            last_output: None,
            interrupt_capture: 0,
            interrupt_flags: 0,
        }
    }

    /// Set the bus settle delay and reset pulse timing
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Current bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Point the handle at another chip without touching the bus
    ///
    /// # Errors
    /// Returns `I2cError::InvalidAddress` outside 0x20-0x27.
    pub fn set_address(&mut self, address: u8) -> I2cResult<()> {
        if !protocol::is_valid_address(address) {
            return Err(I2cError::InvalidAddress(address));
        }
        self.address = address;
        Ok(())
    }

    /// Timing in effect for this handle
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Attach or replace the reset line without touching the chip
    pub fn set_reset_line(&mut self, reset_line: Option<Box<dyn ResetLine>>) {
        self.reset_line = reset_line;
    }

    /// Whether a reset line is attached
    pub fn has_reset_line(&self) -> bool {
        self.reset_line.is_some()
    }

    /// Last byte this handle wrote to GPIO/OLAT, if any
    ///
    /// This is a record of what was written, not of what the pins are doing.
    /// Pin operations always read the chip instead of trusting it.
    pub fn last_output(&self) -> Option<u8> {
        self.last_output
    }

    /// Give back the underlying bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Bring the chip into a known state
    ///
    /// Stores `address` and `reset_line`, pulses RESET if a line is given,
    /// then programs IODIR with `direction` (1 = input) and clears the
    /// outputs. Registers are written after the pulse because RESET restores
    /// power-on defaults.
    ///
    /// # Errors
    /// Returns `I2cError::InvalidAddress` before any bus traffic if `address`
    /// is outside 0x20-0x27, otherwise the first reset line or bus failure.
    pub fn initialize(
        &mut self,
        address: u8,
        direction: u8,
        reset_line: Option<Box<dyn ResetLine>>,
    ) -> I2cResult<()> {
        self.set_address(address)?;
        self.reset_line = reset_line;
        debug!(
            "Initializing MCP23008 at 0x{:02X} (direction 0b{:08b}, reset line: {})",
            address,
            direction,
            self.has_reset_line()
        );

        self.reset()?;
        self.write_register(Register::IoDir, direction)?;
        self.write_register(Register::Gpio, 0x00)?;
        Ok(())
    }

    /// Pulse the RESET line: high, settle, low, hold, high, settle
    ///
    /// Does nothing if no reset line is attached.
    pub fn reset(&mut self) -> I2cResult<()> {
        let timing = self.timing;
        let Some(line) = self.reset_line.as_mut() else {
            trace!("No reset line configured, skipping reset pulse");
            return Ok(());
        };

        debug!("Pulsing RESET for device 0x{:02X}", self.address);
        let drive = |result: std::io::Result<()>| result.map_err(|source| I2cError::ResetLine { source });

        drive(line.set_high())?;
        pause(timing.reset_settle);
        drive(line.set_low())?;
        pause(timing.reset_hold);
        drive(line.set_high())?;
        pause(timing.reset_settle);

        self.last_output = None;
        Ok(())
    }

    /// Read one register
    ///
    /// Writes the register address, then reads a single byte back.
    pub fn read_register(&mut self, reg: Register) -> I2cResult<u8> {
        pause(self.timing.settle_delay);

        let address = self.address;
        let mut buffer = [0u8; 1];
        self.bus
            .write(address, &[reg.to_byte()])
            .and_then(|_| self.bus.read(address, &mut buffer))
            .map_err(|source| I2cError::ReadFailed {
                address,
                register: reg.to_byte(),
                source,
            })?;

        trace!("0x{:02X} {} -> 0x{:02X}", address, reg.name(), buffer[0]);
        Ok(buffer[0])
    }

    /// Write one register
    pub fn write_register(&mut self, reg: Register, value: u8) -> I2cResult<()> {
        pause(self.timing.settle_delay);

        let address = self.address;
        self.bus
            .write(address, &[reg.to_byte(), value])
            .map_err(|source| I2cError::WriteFailed {
                address,
                register: reg.to_byte(),
                source,
            })?;

        trace!("0x{:02X} {} <- 0x{:02X}", address, reg.name(), value);
        if matches!(reg, Register::Gpio | Register::OLat) {
            self.last_output = Some(value);
        }
        Ok(())
    }

    /// Read a register by raw address
    ///
    /// # Errors
    /// Returns `I2cError::InvalidRegister` without touching the bus if
    /// `register` is above 0x0A.
    pub fn read_raw(&mut self, register: u8) -> I2cResult<u8> {
        let reg = Register::from_byte(register).map_err(|_| I2cError::InvalidRegister(register))?;
        self.read_register(reg)
    }

    /// Write a register by raw address
    ///
    /// Use this to change IOCON with merge semantics or to set reserved bits.
    ///
    /// # Errors
    /// Returns `I2cError::InvalidRegister` without touching the bus if
    /// `register` is above 0x0A.
    pub fn write_raw(&mut self, register: u8, value: u8) -> I2cResult<()> {
        let reg = Register::from_byte(register).map_err(|_| I2cError::InvalidRegister(register))?;
        self.write_register(reg, value)
    }

    /// Read every register in address order
    ///
    /// Reading INTCAP and GPIO clears a pending interrupt on the chip.
    pub fn dump(&mut self) -> I2cResult<RegisterDump> {
        let mut bytes = [0u8; 11];
        for (slot, reg) in bytes.iter_mut().zip(Register::ALL) {
            *slot = self.read_register(reg)?;
        }
        Ok(RegisterDump::from_bytes(bytes))
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
