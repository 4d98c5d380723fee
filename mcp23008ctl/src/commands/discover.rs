//! Discover command implementation

use anyhow::Result;
use mcp23008::Bus;
use mcp23008_common::error::AppError;
use mcp23008_common::protocol::{ADDRESS_MAX, ADDRESS_MIN};

/// Print the first responding address, or all of them with `all`
pub fn discover<B: Bus>(bus: &mut B, bus_number: u8, all: bool) -> Result<()> {
    let found = if all {
        mcp23008::scan(bus)
    } else {
        mcp23008::discover(bus).into_iter().collect()
    };

    if found.is_empty() {
        return Err(not_found(bus_number).into());
    }
    for address in found {
        println!("0x{:02X}", address);
    }
    Ok(())
}

/// Error for a bus where nothing answered in 0x20-0x27
pub fn not_found(bus: u8) -> AppError {
    AppError::DeviceNotFound {
        bus,
        first: ADDRESS_MIN,
        last: ADDRESS_MAX,
    }
}
