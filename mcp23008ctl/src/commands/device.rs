//! Device-wide commands: init, reset, status, raw register access, IOCON

use anyhow::Result;
use mcp23008::{Bus, IoCon, Mcp23008, Register, RegisterDump, ResetLine};
use serde_json::json;

/// Reset the chip (if a line is given) and program IODIR
pub fn init<B: Bus>(
    device: &mut Mcp23008<B>,
    direction: u8,
    reset_line: Option<Box<dyn ResetLine>>,
) -> Result<()> {
    let address = device.address();
    device.initialize(address, direction, reset_line)?;
    println!(
        "Initialized 0x{:02X}: direction 0b{:08b}, outputs cleared",
        address, direction
    );
    Ok(())
}

/// Pulse RESET; every register returns to its power-on value
pub fn reset<B: Bus>(device: &mut Mcp23008<B>, reset_line: Box<dyn ResetLine>) -> Result<()> {
    device.set_reset_line(Some(reset_line));
    device.reset()?;
    println!("Reset 0x{:02X}", device.address());
    Ok(())
}

/// Print every register, as a table or as JSON
pub fn status<B: Bus>(device: &mut Mcp23008<B>, json: bool) -> Result<()> {
    let dump = device.dump()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status_json(device.address(), &dump))?);
    } else {
        print_status(device.address(), &dump);
    }
    Ok(())
}

fn status_json(address: u8, dump: &RegisterDump) -> serde_json::Value {
    json!({
        "address": address,
        "registers": dump,
        "iocon": dump.device_config(),
    })
}

fn print_status(address: u8, dump: &RegisterDump) {
    println!();
    println!("MCP23008 at 0x{:02X}", address);
    println!();
    print!("{}", dump);
    println!();
    print_iocon(&dump.device_config());
    println!();
}

fn print_iocon(config: &IoCon) {
    let flags = [
        ("INTPOL", config.interrupt_active_high),
        ("ODR", config.open_drain),
        ("HAEN", config.hardware_address),
        ("DISSLW", config.slew_rate_disabled),
        ("SEQOP", config.sequential_disabled),
    ];
    for (name, set) in flags {
        println!("{:<8} {}", name, set as u8);
    }
}

/// Print one register
pub fn get<B: Bus>(device: &mut Mcp23008<B>, register: Register) -> Result<()> {
    let value = device.read_register(register)?;
    println!("{} 0x{:02X} 0b{:08b}", register.name(), value, value);
    Ok(())
}

/// Write one register
pub fn set<B: Bus>(device: &mut Mcp23008<B>, register: Register, value: u8) -> Result<()> {
    if register.is_read_only() {
        anyhow::bail!("{} is read-only", register.name());
    }
    device.write_register(register, value)?;
    println!("{} <- 0x{:02X}", register.name(), value);
    Ok(())
}

/// Replace IOCON
pub fn iocon<B: Bus>(device: &mut Mcp23008<B>, config: IoCon) -> Result<()> {
    device.set_device_config(config)?;
    print_iocon(&device.device_config()?);
    Ok(())
}
