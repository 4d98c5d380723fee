//! Driver for the Microchip MCP23008 8-bit I2C GPIO expander
//!
//! The driver is generic over a [`Bus`] so it runs against Linux i2c-dev
//! ([`LinuxBus`]) or the in-memory [`mock::MockBus`] used by the tests.
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn main() -> Result<(), mcp23008::I2cError> {
//! use mcp23008::{GPIO_ALL_OUTPUT, LinuxBus, Mcp23008};
//!
//! let mut bus = LinuxBus::open(1)?;
//! let address = mcp23008::discover(&mut bus).unwrap_or(mcp23008::DEFAULT_ADDRESS);
//!
//! let mut expander = Mcp23008::new(bus);
//! expander.initialize(address, GPIO_ALL_OUTPUT, None)?;
//! expander.set_pin_high(3)?;
//! # Ok(())
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```

pub mod bus;
pub mod device;
pub mod discovery;
mod interrupt;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod mock;
mod pins;

pub use bus::{Bus, ResetLine};
pub use device::{DEFAULT_ADDRESS, Mcp23008};
pub use discovery::{discover, scan};
#[cfg(target_os = "linux")]
pub use linux::{LinuxBus, SysfsResetLine};

pub use mcp23008_common::error::{I2cError, I2cResult};
pub use mcp23008_common::protocol::{GPIO_ALL_INPUT, GPIO_ALL_OUTPUT, IoCon, PIN_COUNT, Register};
pub use mcp23008_common::types::{InterruptMode, RegisterDump, Timing};
