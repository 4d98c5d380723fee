//! Configuration loading and device attachment shared by every command

use mcp23008::{Bus, Mcp23008};
use mcp23008_common::config::{Config, DEFAULT_CONFIG_FILE};
use mcp23008_common::error::Result;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::commands::discover::not_found;

/// Load the configuration file and apply command-line overrides
///
/// An explicit `--conf` must exist; the default location may be missing.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.conf {
        Some(path) => {
            let config = Config::from_file(path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => Config::from_file_or_default(DEFAULT_CONFIG_FILE)?,
    };

    // Apply CLI overrides
    if let Some(i2c_bus) = cli.i2c_bus {
        config.i2c_bus = i2c_bus;
    }
    if let Some(i2c_addr) = cli.i2c_addr {
        config.i2c_addr = Some(i2c_addr);
    }
    if let Some(reset_gpio) = cli.reset_gpio {
        config.reset_gpio = Some(reset_gpio);
    }
    if let Some(settle_delay_ms) = cli.settle_delay_ms {
        config.settle_delay_ms = settle_delay_ms;
    }

    config.validate()?;
    Ok(config)
}

/// Configured address, or the first chip found on the bus
pub fn resolve_address<B: Bus>(bus: &mut B, config: &Config) -> Result<u8> {
    match config.i2c_addr {
        Some(address) => Ok(address),
        None => {
            debug!("No address configured, scanning bus {}", config.i2c_bus);
            mcp23008::discover(bus).ok_or_else(|| not_found(config.i2c_bus))
        }
    }
}

/// Build a device handle for the configured chip
pub fn attach<B: Bus>(mut bus: B, config: &Config) -> Result<Mcp23008<B>> {
    let address = resolve_address(&mut bus, config)?;
    info!("Using MCP23008 at 0x{:02X} on bus {}", address, config.i2c_bus);

    let mut device = Mcp23008::new(bus).with_timing(config.timing());
    device.set_address(address)?;
    Ok(device)
}
