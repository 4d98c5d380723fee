//! I2C protocol definitions for the MCP23008
//!
//! This module defines the register addresses, the IOCON configuration
//! bitfield and the pin/bit helpers used when talking to the chip. The
//! register layout is fixed by the silicon and must stay bit-exact.

use serde::{Deserialize, Serialize};

/// Number of GPIO pins on the chip
pub const PIN_COUNT: u8 = 8;

/// Lowest hardware-strapped bus address (A2..A0 = 000)
pub const ADDRESS_MIN: u8 = 0x20;

/// Highest hardware-strapped bus address (A2..A0 = 111)
pub const ADDRESS_MAX: u8 = 0x27;

/// Direction mask: every pin an output
pub const GPIO_ALL_OUTPUT: u8 = 0x00;

/// Direction mask: every pin an input
pub const GPIO_ALL_INPUT: u8 = 0xFF;

// ============================================================================
// Register Addresses
// ============================================================================

/// I/O direction (1 = input, 0 = output)
pub const REG_IODIR: u8 = 0x00;

/// Input polarity (1 = GPIO reflects the inverted pin level)
pub const REG_IPOL: u8 = 0x01;

/// Interrupt-on-change enable
pub const REG_GPINTEN: u8 = 0x02;

/// Default compare value for interrupt-on-change
pub const REG_DEFVAL: u8 = 0x03;

/// Interrupt control (1 = compare against DEFVAL, 0 = against previous value)
pub const REG_INTCON: u8 = 0x04;

/// Device configuration (see [`IoCon`])
pub const REG_IOCON: u8 = 0x05;

/// Pull-up resistor enable
pub const REG_GPPU: u8 = 0x06;

/// Interrupt flags (read-only)
pub const REG_INTF: u8 = 0x07;

/// Port value captured at interrupt time (read-only)
pub const REG_INTCAP: u8 = 0x08;

/// Port value; writes go to the output latch
pub const REG_GPIO: u8 = 0x09;

/// Output latch
pub const REG_OLAT: u8 = 0x0A;

// ============================================================================
// Register Enum
// ============================================================================

/// One of the eleven addressable MCP23008 registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    IoDir = REG_IODIR,
    IPol = REG_IPOL,
    GpIntEn = REG_GPINTEN,
    DefVal = REG_DEFVAL,
    IntCon = REG_INTCON,
    IoCon = REG_IOCON,
    Gppu = REG_GPPU,
    IntF = REG_INTF,
    IntCap = REG_INTCAP,
    Gpio = REG_GPIO,
    OLat = REG_OLAT,
}

impl Register {
    /// All registers in address order
    pub const ALL: [Register; 11] = [
        Register::IoDir,
        Register::IPol,
        Register::GpIntEn,
        Register::DefVal,
        Register::IntCon,
        Register::IoCon,
        Register::Gppu,
        Register::IntF,
        Register::IntCap,
        Register::Gpio,
        Register::OLat,
    ];

    /// Create a Register from its address
    pub fn from_byte(value: u8) -> Result<Self, ProtocolError> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(ProtocolError::InvalidRegister(value))
    }

    /// Register address on the wire
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Datasheet name of the register
    pub fn name(&self) -> &'static str {
        match self {
            Register::IoDir => "IODIR",
            Register::IPol => "IPOL",
            Register::GpIntEn => "GPINTEN",
            Register::DefVal => "DEFVAL",
            Register::IntCon => "INTCON",
            Register::IoCon => "IOCON",
            Register::Gppu => "GPPU",
            Register::IntF => "INTF",
            Register::IntCap => "INTCAP",
            Register::Gpio => "GPIO",
            Register::OLat => "OLAT",
        }
    }

    /// Look a register up by datasheet name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        Self::ALL
            .iter()
            .copied()
            .find(|reg| reg.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProtocolError::UnknownRegisterName(name.to_string()))
    }

    /// Whether the chip ignores writes to this register
    pub fn is_read_only(&self) -> bool {
        matches!(self, Register::IntF | Register::IntCap)
    }

    /// Value after power-on or a RESET pulse
    pub fn power_on_value(&self) -> u8 {
        match self {
            Register::IoDir => GPIO_ALL_INPUT,
            _ => 0x00,
        }
    }
}

// ============================================================================
// IOCON Bitfield
// ============================================================================

/// IOCON bit 1: INT output polarity (1 = active-high)
pub const IOCON_INTPOL: u8 = 1 << 1;

/// IOCON bit 2: INT output is open-drain (overrides INTPOL)
pub const IOCON_ODR: u8 = 1 << 2;

/// IOCON bit 3: hardware address enable (MCP23S08 only)
pub const IOCON_HAEN: u8 = 1 << 3;

/// IOCON bit 4: SDA slew rate control disabled
pub const IOCON_DISSLW: u8 = 1 << 4;

/// IOCON bit 5: sequential operation disabled
pub const IOCON_SEQOP: u8 = 1 << 5;

/// Unimplemented IOCON bits (0, 6 and 7)
pub const IOCON_RESERVED_MASK: u8 = 0b1100_0001;

/// Decoded IOCON register
///
/// Packing never sets the reserved bits and unpacking ignores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoCon {
    /// INT output is active-high
    pub interrupt_active_high: bool,
    /// INT output is open-drain
    pub open_drain: bool,
    /// Hardware address pins enabled
    pub hardware_address: bool,
    /// SDA slew rate control disabled
    pub slew_rate_disabled: bool,
    /// Address pointer does not increment
    pub sequential_disabled: bool,
}

impl IoCon {
    /// Pack the named flags into the register byte
    pub fn to_byte(self) -> u8 {
        let mut value = 0;
        value = with_bits(value, IOCON_INTPOL, self.interrupt_active_high);
        value = with_bits(value, IOCON_ODR, self.open_drain);
        value = with_bits(value, IOCON_HAEN, self.hardware_address);
        value = with_bits(value, IOCON_DISSLW, self.slew_rate_disabled);
        with_bits(value, IOCON_SEQOP, self.sequential_disabled)
    }

    /// Unpack a register byte
    pub fn from_byte(value: u8) -> Self {
        Self {
            interrupt_active_high: value & IOCON_INTPOL != 0,
            open_drain: value & IOCON_ODR != 0,
            hardware_address: value & IOCON_HAEN != 0,
            slew_rate_disabled: value & IOCON_DISSLW != 0,
            sequential_disabled: value & IOCON_SEQOP != 0,
        }
    }
}

// ============================================================================
// Pin Helpers
// ============================================================================

/// Bit mask for a pin, or `None` if the pin number is out of range
pub fn pin_mask(pin: u8) -> Option<u8> {
    (pin < PIN_COUNT).then(|| 1 << pin)
}

/// Whether `bit` (0-7) is set in `value`
pub fn is_bit_high(value: u8, bit: u8) -> bool {
    pin_mask(bit).is_some_and(|mask| value & mask != 0)
}

/// Whether `address` is one of the eight strappable bus addresses
pub fn is_valid_address(address: u8) -> bool {
    (ADDRESS_MIN..=ADDRESS_MAX).contains(&address)
}

/// Set or clear the bits of `mask` in `value`
pub fn with_bits(value: u8, mask: u8, set: bool) -> u8 {
    if set { value | mask } else { value & !mask }
}

// ============================================================================
// Errors
// ============================================================================

/// Protocol errors for register addressing
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid register address: 0x{0:02X} (expected 0x00-0x0A)")]
    InvalidRegister(u8),

    #[error("Unknown register name: {0}")]
    UnknownRegisterName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_conversion() {
        assert_eq!(Register::from_byte(0x00).unwrap(), Register::IoDir);
        assert_eq!(Register::from_byte(0x05).unwrap(), Register::IoCon);
        assert_eq!(Register::from_byte(0x0A).unwrap(), Register::OLat);
        assert!(Register::from_byte(0x0B).is_err());
        assert!(Register::from_byte(0xFF).is_err());

        for (addr, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.to_byte() as usize, addr);
        }
    }

    #[test]
    fn test_register_names() {
        assert_eq!(Register::Gppu.name(), "GPPU");
        assert_eq!(Register::from_name("intcap").unwrap(), Register::IntCap);
        assert_eq!(Register::from_name("OLAT").unwrap(), Register::OLat);
        assert!(Register::from_name("PORTA").is_err());
    }

    #[test]
    fn test_read_only_registers() {
        let read_only: Vec<_> = Register::ALL.iter().filter(|r| r.is_read_only()).collect();
        assert_eq!(read_only, [&Register::IntF, &Register::IntCap]);
    }

    #[test]
    fn test_iocon_bit_positions() {
        let only = |f: fn(&mut IoCon)| {
            let mut c = IoCon::default();
            f(&mut c);
            c.to_byte()
        };
        assert_eq!(only(|c| c.interrupt_active_high = true), 0b0000_0010);
        assert_eq!(only(|c| c.open_drain = true), 0b0000_0100);
        assert_eq!(only(|c| c.hardware_address = true), 0b0000_1000);
        assert_eq!(only(|c| c.slew_rate_disabled = true), 0b0001_0000);
        assert_eq!(only(|c| c.sequential_disabled = true), 0b0010_0000);
    }

    #[test]
    fn test_iocon_never_sets_reserved_bits() {
        let all = IoCon {
            interrupt_active_high: true,
            open_drain: true,
            hardware_address: true,
            slew_rate_disabled: true,
            sequential_disabled: true,
        };
        assert_eq!(all.to_byte(), 0b0011_1110);
        assert_eq!(all.to_byte() & IOCON_RESERVED_MASK, 0);
    }

    #[test]
    fn test_iocon_unpack_ignores_reserved_bits() {
        let config = IoCon::from_byte(0b1100_0101);
        assert!(config.open_drain);
        assert!(!config.interrupt_active_high);
        assert_eq!(config.to_byte(), IOCON_ODR);
    }

    #[test]
    fn test_pin_mask() {
        assert_eq!(pin_mask(0), Some(0x01));
        assert_eq!(pin_mask(7), Some(0x80));
        assert_eq!(pin_mask(8), None);
        assert_eq!(pin_mask(255), None);
    }

    #[test]
    fn test_is_bit_high() {
        assert!(is_bit_high(0b0000_1000, 3));
        assert!(!is_bit_high(0b0000_1000, 2));
        assert!(!is_bit_high(0xFF, 8));
    }

    #[test]
    fn test_address_range() {
        assert!(!is_valid_address(0x1F));
        assert!(is_valid_address(0x20));
        assert!(is_valid_address(0x27));
        assert!(!is_valid_address(0x28));
    }

    #[test]
    fn test_with_bits() {
        assert_eq!(with_bits(0b1010, 0b0001, true), 0b1011);
        assert_eq!(with_bits(0b1010, 0b0010, false), 0b1000);
        assert_eq!(with_bits(0b1010, 0b0010, true), 0b1010);
    }
}
