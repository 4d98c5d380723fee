//! In-memory MCP23008 simulation
//!
//! `MockBus` models one or more chips on a bus closely enough to exercise the
//! driver without hardware:
//! - power-on defaults (IODIR = 0xFF, everything else 0)
//! - writes to GPIO land in OLAT, writes to INTF/INTCAP are ignored
//! - the address pointer increments after each byte unless IOCON.SEQOP is set
//! - reading GPIO or INTCAP clears the pending interrupt
//! - input pins can be driven externally with [`MockBus::drive_pins`]
//! - absent devices (and devices held in reset) do not acknowledge
//!
//! Every transaction is recorded so tests can assert on bus traffic.
//! `MockBus` is a cheap handle: clones share the same simulated bus, across
//! threads if needed.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mcp23008_common::protocol::{IOCON_SEQOP, Register};

use crate::bus::{Bus, ResetLine};

/// One recorded bus event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Write { address: u8, bytes: Vec<u8> },
    Read { address: u8, len: usize },
    Probe { address: u8 },
    Reset { address: u8, high: bool },
}

impl Transaction {
    /// Whether this event went over the I2C bus (as opposed to the reset line)
    pub fn is_bus(&self) -> bool {
        !matches!(self, Transaction::Reset { .. })
    }
}

#[derive(Debug, Clone)]
struct MockChip {
    registers: [u8; 11],
    pointer: u8,
    /// Levels applied to the pins from outside
    pins: u8,
    in_reset: bool,
}

impl MockChip {
    fn new() -> Self {
        Self {
            registers: Register::ALL.map(|reg| reg.power_on_value()),
            pointer: 0,
            pins: 0,
            in_reset: false,
        }
    }

    fn reg(&self, reg: Register) -> u8 {
        self.registers[reg.to_byte() as usize]
    }

    fn reg_mut(&mut self, reg: Register) -> &mut u8 {
        &mut self.registers[reg.to_byte() as usize]
    }

    fn power_on(&mut self) {
        self.registers = Register::ALL.map(|reg| reg.power_on_value());
        self.pointer = 0;
    }

    /// Port value as seen through the GPIO register
    fn port(&self) -> u8 {
        let iodir = self.reg(Register::IoDir);
        let levels = (self.reg(Register::OLat) & !iodir) | (self.pins & iodir);
        levels ^ (self.reg(Register::IPol) & iodir)
    }

    fn advance(&mut self) {
        if self.reg(Register::IoCon) & IOCON_SEQOP == 0 {
            self.pointer = (self.pointer + 1) % Register::ALL.len() as u8;
        }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let reg = pointer_register(self.pointer)?;
        let value = match reg {
            Register::Gpio => {
                let value = self.port();
                *self.reg_mut(Register::IntF) = 0;
                value
            }
            Register::IntCap => {
                let value = self.reg(Register::IntCap);
                *self.reg_mut(Register::IntF) = 0;
                value
            }
            other => self.reg(other),
        };
        self.advance();
        Ok(value)
    }

    fn write_byte(&mut self, value: u8) -> io::Result<()> {
        match pointer_register(self.pointer)? {
            Register::IntF | Register::IntCap => {}
            Register::Gpio => *self.reg_mut(Register::OLat) = value,
            other => *self.reg_mut(other) = value,
        }
        self.advance();
        Ok(())
    }

    fn drive(&mut self, levels: u8) {
        let previous = self.port();
        self.pins = levels;
        let current = self.port();

        let armed = self.reg(Register::GpIntEn) & self.reg(Register::IoDir);
        let intcon = self.reg(Register::IntCon);
        let against_default = (current ^ self.reg(Register::DefVal)) & intcon;
        let against_previous = (current ^ previous) & !intcon;
        let fired = (against_default | against_previous) & armed;

        if fired != 0 && self.reg(Register::IntF) == 0 {
            *self.reg_mut(Register::IntF) = fired;
            *self.reg_mut(Register::IntCap) = current;
        }
    }
}

fn pointer_register(pointer: u8) -> io::Result<Register> {
    Register::from_byte(pointer).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

fn nack(address: u8) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotConnected,
        format!("no acknowledge from 0x{:02X}", address),
    )
}

#[derive(Debug, Default)]
struct BusState {
    chips: BTreeMap<u8, MockChip>,
    log: Vec<Transaction>,
}

impl BusState {
    fn chip(&mut self, address: u8) -> io::Result<&mut MockChip> {
        match self.chips.get_mut(&address) {
            Some(chip) if !chip.in_reset => Ok(chip),
            _ => Err(nack(address)),
        }
    }

    fn chip_or_panic(&mut self, address: u8) -> &mut MockChip {
        self.chips
            .get_mut(&address)
            .unwrap_or_else(|| panic!("no simulated device at 0x{:02X}", address))
    }
}

/// Simulated I2C bus with MCP23008 chips attached
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<BusState>>,
}

/// Lock the shared state; a panicking test thread does not poison the bus
fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBus {
    /// Empty bus: nothing acknowledges
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus with a single chip at `address`
    pub fn with_device(address: u8) -> Self {
        let bus = Self::new();
        bus.add_device(address);
        bus
    }

    /// Attach a chip in its power-on state
    pub fn add_device(&self, address: u8) {
        lock(&self.state).chips.insert(address, MockChip::new());
    }

    /// Current value of a register, without side effects or logging
    ///
    /// GPIO reports the computed port value.
    pub fn register(&self, address: u8, reg: Register) -> u8 {
        let mut state = lock(&self.state);
        let chip = state.chip_or_panic(address);
        match reg {
            Register::Gpio => chip.port(),
            other => chip.reg(other),
        }
    }

    /// Overwrite a stored register value, without logging
    ///
    /// GPIO writes go to OLAT like on the real chip.
    pub fn set_register(&self, address: u8, reg: Register, value: u8) {
        let mut state = lock(&self.state);
        let chip = state.chip_or_panic(address);
        let target = if reg == Register::Gpio {
            Register::OLat
        } else {
            reg
        };
        *chip.reg_mut(target) = value;
    }

    /// Apply external levels to the pins; only input pins observe them
    ///
    /// Raises INTF/INTCAP for enabled input pins the same way the chip does.
    pub fn drive_pins(&self, address: u8, levels: u8) {
        lock(&self.state).chip_or_panic(address).drive(levels);
    }

    /// Every recorded event, oldest first
    pub fn transactions(&self) -> Vec<Transaction> {
        lock(&self.state).log.clone()
    }

    /// Number of I2C transactions (reset line events excluded)
    pub fn transaction_count(&self) -> usize {
        lock(&self.state).log.iter().filter(|t| t.is_bus()).count()
    }

    /// Register writes as `(register, value)` pairs for one device
    pub fn register_writes(&self, address: u8) -> Vec<(u8, u8)> {
        lock(&self.state)
            .log
            .iter()
            .filter_map(|t| match t {
                Transaction::Write { address: a, bytes } if *a == address && bytes.len() == 2 => {
                    Some((bytes[0], bytes[1]))
                }
                _ => None,
            })
            .collect()
    }

    /// Forget recorded events
    pub fn clear_log(&self) {
        lock(&self.state).log.clear();
    }

    /// Reset line wired to the chip at `address`
    pub fn reset_line(&self, address: u8) -> MockResetLine {
        MockResetLine {
            state: Arc::clone(&self.state),
            address,
        }
    }
}

impl Bus for MockBus {
    fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()> {
        let mut state = lock(&self.state);
        state.log.push(Transaction::Write {
            address,
            bytes: bytes.to_vec(),
        });

        let chip = state.chip(address)?;
        if let Some((&pointer, data)) = bytes.split_first() {
            chip.pointer = pointer;
            for &value in data {
                chip.write_byte(value)?;
            }
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> io::Result<()> {
        let mut state = lock(&self.state);
        state.log.push(Transaction::Read {
            address,
            len: buffer.len(),
        });

        let chip = state.chip(address)?;
        for byte in buffer.iter_mut() {
            *byte = chip.read_byte()?;
        }
        Ok(())
    }

    fn probe(&mut self, address: u8) -> bool {
        let mut state = lock(&self.state);
        state.log.push(Transaction::Probe { address });
        state.chip(address).is_ok()
    }
}

/// Simulated RESET line; releasing it returns the chip to power-on defaults
#[derive(Debug, Clone)]
pub struct MockResetLine {
    state: Arc<Mutex<BusState>>,
    address: u8,
}

impl MockResetLine {
    fn set(&mut self, high: bool) -> io::Result<()> {
        let mut state = lock(&self.state);
        state.log.push(Transaction::Reset {
            address: self.address,
            high,
        });

        if let Some(chip) = state.chips.get_mut(&self.address) {
            if high && chip.in_reset {
                chip.power_on();
            }
            chip.in_reset = !high;
        }
        Ok(())
    }
}

impl ResetLine for MockResetLine {
    fn set_high(&mut self) -> io::Result<()> {
        self.set(true)
    }

    fn set_low(&mut self) -> io::Result<()> {
        self.set(false)
    }
}
