mod cli;
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
mod commands;
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
mod setup;

use clap::Parser;

use cli::Cli;

#[cfg(target_os = "linux")]
use anyhow::Result;
#[cfg(target_os = "linux")]
use mcp23008::{IoCon, LinuxBus, ResetLine, SysfsResetLine};
#[cfg(target_os = "linux")]
use mcp23008_common::config::Config;
#[cfg(target_os = "linux")]
use mcp23008_common::error::AppError;
#[cfg(target_os = "linux")]
use tracing::debug;
#[cfg(target_os = "linux")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(target_os = "linux")]
use cli::Commands;

#[cfg(target_os = "linux")]
fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "mcp23008ctl=debug,mcp23008=debug"
    } else {
        "mcp23008ctl=info,mcp23008=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(target_os = "linux")]
fn run(cli: Cli) -> Result<()> {
    debug!("mcp23008ctl version {}", mcp23008_common::VERSION);
    let config = setup::load_config(&cli)?;
    debug!(
        "Configuration: I2C bus {}, address {}",
        config.i2c_bus,
        config
            .i2c_addr
            .map_or_else(|| "auto".to_string(), |a| format!("0x{:02X}", a))
    );

    let mut bus = LinuxBus::open(config.i2c_bus).map_err(AppError::from)?;

    if let Commands::Discover { all } = cli.command {
        return commands::discover::discover(&mut bus, config.i2c_bus, all);
    }

    let mut device = setup::attach(bus, &config)?;

    match cli.command {
        Commands::Discover { .. } => Ok(()),
        Commands::Init { direction } => {
            let reset_line = open_reset_line(&config)?;
            commands::device::init(
                &mut device,
                direction.unwrap_or(config.direction),
                reset_line,
            )
        }
        Commands::Reset => match open_reset_line(&config)? {
            Some(line) => commands::device::reset(&mut device, line),
            None => anyhow::bail!("No reset line configured (set reset-gpio or --reset-gpio)"),
        },
        Commands::Status { json } => commands::device::status(&mut device, json),
        Commands::Get { register } => commands::device::get(&mut device, register),
        Commands::Set { register, value } => commands::device::set(&mut device, register, value),
        Commands::Pin { action } => commands::pin::pin(&mut device, action),
        Commands::Pullup { pin, state } => commands::pin::pullup(&mut device, pin, state.into()),
        Commands::Invert => commands::pin::invert(&mut device),
        Commands::Iocon {
            intpol,
            odr,
            haen,
            disslw,
            seqop,
        } => commands::device::iocon(
            &mut device,
            IoCon {
                interrupt_active_high: intpol,
                open_drain: odr,
                hardware_address: haen,
                slew_rate_disabled: disslw,
                sequential_disabled: seqop,
            },
        ),
        Commands::Interrupt { action } => commands::interrupt::interrupt(&mut device, action),
    }
}

#[cfg(target_os = "linux")]
fn open_reset_line(config: &Config) -> mcp23008_common::error::Result<Option<Box<dyn ResetLine>>> {
    let Some(gpio) = config.reset_gpio else {
        return Ok(None);
    };
    let line = SysfsResetLine::open(gpio).map_err(|source| AppError::ResetGpio { gpio, source })?;
    Ok(Some(Box::new(line)))
}

#[cfg(not(target_os = "linux"))]
fn main() {
    let _ = Cli::parse();
    eprintln!("mcp23008ctl requires Linux for I2C device access");
    std::process::exit(1);
}
