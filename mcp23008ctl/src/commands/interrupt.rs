//! Interrupt commands

use anyhow::Result;
use mcp23008::{Bus, Mcp23008};

use crate::cli::InterruptAction;

/// Run an `interrupt` subcommand
pub fn interrupt<B: Bus>(device: &mut Mcp23008<B>, action: InterruptAction) -> Result<()> {
    match action {
        InterruptAction::Arm {
            active_high,
            open_drain,
        } => {
            device.arm_interrupt_source(active_high, open_drain)?;
            let config = device.device_config()?;
            println!(
                "INT output: {}, {}",
                if config.interrupt_active_high {
                    "active-high"
                } else {
                    "active-low"
                },
                if config.open_drain {
                    "open-drain"
                } else {
                    "push-pull"
                }
            );
        }
        InterruptAction::Enable { pin, compare_high } => {
            device.enable_interrupt_on_pin(pin, compare_high)?;
            println!(
                "Interrupt enabled on pin {} (DEFVAL {})",
                pin, compare_high as u8
            );
        }
        InterruptAction::Disable { pin } => {
            device.disable_interrupt_on_pin(pin)?;
            println!("Interrupt disabled on pin {}", pin);
        }
        InterruptAction::Mode { pin, mode } => {
            device.set_interrupt_mode(pin, mode.into())?;
            println!("Pin {} interrupt mode: {:?}", pin, mode);
        }
        InterruptAction::Read => {
            // INTF first: the INTCAP read clears it
            let flags = device.refresh_interrupt_flags()?;
            let capture = device.refresh_interrupt_capture()?;
            println!("INTF   0b{:08b}", flags);
            println!("INTCAP 0b{:08b}", capture);
            println!("Pins   {:?}", device.flagged_pins());
        }
    }
    Ok(())
}
