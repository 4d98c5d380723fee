//! Command-line definition and argument parsers

use clap::{Parser, Subcommand, ValueEnum};
use mcp23008::{InterruptMode, Register};
use std::path::PathBuf;

/// MCP23008 GPIO expander control
#[derive(Parser)]
#[command(name = "mcp23008ctl")]
#[command(about = "Control an MCP23008 I2C GPIO expander", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub conf: Option<PathBuf>,

    /// I2C bus number
    #[arg(long, global = true)]
    pub i2c_bus: Option<u8>,

    /// Device address (0x20-0x27); scanned for when not given
    #[arg(long, value_parser = parse_byte, global = true)]
    pub i2c_addr: Option<u8>,

    /// Sysfs GPIO number wired to RESET
    #[arg(long, global = true)]
    pub reset_gpio: Option<u32>,

    /// Delay before every register transaction (milliseconds)
    #[arg(long, global = true)]
    pub settle_delay_ms: Option<u64>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Find MCP23008 chips on the bus
    Discover {
        /// List every responding address instead of the first
        #[arg(long)]
        all: bool,
    },
    /// Reset (if wired) and program the direction register
    Init {
        /// Direction mask, 1 = input (defaults to the configured value)
        #[arg(long, value_parser = parse_byte)]
        direction: Option<u8>,
    },
    /// Pulse the RESET line
    Reset,
    /// Dump every register
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read a register by name or address
    Get {
        #[arg(value_parser = parse_register)]
        register: Register,
    },
    /// Write a register by name or address
    Set {
        #[arg(value_parser = parse_register)]
        register: Register,
        #[arg(value_parser = parse_byte)]
        value: u8,
    },
    /// Drive or read a single pin
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },
    /// Switch the internal pull-up of a pin
    Pullup {
        #[arg(value_parser = parse_pin)]
        pin: u8,
        state: Switch,
    },
    /// Flip the input polarity of every pin
    Invert,
    /// Replace IOCON with the given flags (unset flags are cleared)
    Iocon {
        /// INT output active-high
        #[arg(long)]
        intpol: bool,
        /// INT output open-drain
        #[arg(long)]
        odr: bool,
        /// Enable hardware address pins
        #[arg(long)]
        haen: bool,
        /// Disable SDA slew rate control
        #[arg(long)]
        disslw: bool,
        /// Disable address pointer increment
        #[arg(long)]
        seqop: bool,
    },
    /// Interrupt-on-change setup and servicing
    Interrupt {
        #[command(subcommand)]
        action: InterruptAction,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum PinAction {
    /// Drive an output high
    High {
        #[arg(value_parser = parse_pin)]
        pin: u8,
    },
    /// Drive an output low
    Low {
        #[arg(value_parser = parse_pin)]
        pin: u8,
    },
    /// Print the level of a pin
    Read {
        #[arg(value_parser = parse_pin)]
        pin: u8,
    },
    /// Read-modify-write the GPIO register
    Write {
        #[arg(value_parser = parse_pin)]
        pin: u8,
        level: Level,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum InterruptAction {
    /// Configure the INT output (flags are only ever set)
    Arm {
        /// INT output active-high
        #[arg(long)]
        active_high: bool,
        /// INT output open-drain
        #[arg(long)]
        open_drain: bool,
    },
    /// Make a pin an input and enable interrupt-on-change for it
    Enable {
        #[arg(value_parser = parse_pin)]
        pin: u8,
        /// Compare level written to DEFVAL
        #[arg(long)]
        compare_high: bool,
    },
    /// Disable interrupt-on-change for a pin
    Disable {
        #[arg(value_parser = parse_pin)]
        pin: u8,
    },
    /// Choose what a pin is compared against
    Mode {
        #[arg(value_parser = parse_pin)]
        pin: u8,
        mode: Mode,
    },
    /// Read INTF and INTCAP (clears the pending interrupt)
    Read,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum Level {
    #[value(alias = "1")]
    High,
    #[value(alias = "0")]
    Low,
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        switch == Switch::On
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    /// Interrupt on any change from the previous value
    AnyChange,
    /// Interrupt while the pin differs from DEFVAL
    CompareDefault,
}

impl From<Mode> for InterruptMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::AnyChange => InterruptMode::AnyChange,
            Mode::CompareDefault => InterruptMode::CompareDefault,
        }
    }
}

/// Parse a byte written as `0x..`, `0b..` or decimal
pub fn parse_byte(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u8::from_str_radix(&bin.replace('_', ""), 2)
    } else {
        s.parse::<u8>()
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", s, e))
}

/// Parse a register given by datasheet name (`gpio`, `IODIR`) or address
pub fn parse_register(s: &str) -> Result<Register, String> {
    if let Ok(reg) = Register::from_name(s) {
        return Ok(reg);
    }
    let address = parse_byte(s).map_err(|_| format!("unknown register '{}'", s))?;
    Register::from_byte(address).map_err(|e| e.to_string())
}

/// Parse a pin number in 0-7
pub fn parse_pin(s: &str) -> Result<u8, String> {
    let pin: u8 = s
        .parse()
        .map_err(|_| format!("invalid pin '{}'", s))?;
    if pin >= mcp23008::PIN_COUNT {
        return Err(format!("pin {} is out of range (expected 0-7)", pin));
    }
    Ok(pin)
}
