//! Pin-level commands

use anyhow::Result;
use mcp23008::{Bus, Mcp23008, Register};

use crate::cli::PinAction;

/// Run a `pin` subcommand
pub fn pin<B: Bus>(device: &mut Mcp23008<B>, action: PinAction) -> Result<()> {
    match action {
        PinAction::High { pin } => {
            device.set_pin_high(pin)?;
            println!("Pin {} high", pin);
        }
        PinAction::Low { pin } => {
            device.set_pin_low(pin)?;
            println!("Pin {} low", pin);
        }
        PinAction::Read { pin } => {
            let level = device.read_pin(pin)?;
            println!("{}", level as u8);
        }
        PinAction::Write { pin, level } => {
            let high = bool::from(level);
            device.write_pin(pin, high)?;
            println!("Pin {} {}", pin, if high { "high" } else { "low" });
        }
    }
    Ok(())
}

/// Switch the pull-up of one pin
pub fn pullup<B: Bus>(device: &mut Mcp23008<B>, pin: u8, enabled: bool) -> Result<()> {
    device.set_pull_up(pin, enabled)?;
    println!(
        "Pin {} pull-up {}",
        pin,
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

/// Flip IPOL and print the new value
pub fn invert<B: Bus>(device: &mut Mcp23008<B>) -> Result<()> {
    device.invert_polarity()?;
    let ipol = device.read_register(Register::IPol)?;
    println!("IPOL 0b{:08b}", ipol);
    Ok(())
}
