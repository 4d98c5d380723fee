//! Pin-level operations
//!
//! Pin numbers outside 0-7 are ignored: the call returns `Ok` (or `false` for
//! reads) without any bus traffic. Every operation reads the live register
//! before modifying it, since input pins change without the host writing.

use mcp23008_common::error::I2cResult;
use mcp23008_common::protocol::{Register, pin_mask, with_bits};
use tracing::trace;

use crate::bus::Bus;
use crate::device::Mcp23008;

impl<B: Bus> Mcp23008<B> {
    /// Drive an output pin high
    ///
    /// Reads the output latch and writes it back only if the bit changes.
    pub fn set_pin_high(&mut self, pin: u8) -> I2cResult<()> {
        self.update_latch(pin, true)
    }

    /// Drive an output pin low
    ///
    /// Reads the output latch and writes it back only if the bit changes.
    pub fn set_pin_low(&mut self, pin: u8) -> I2cResult<()> {
        self.update_latch(pin, false)
    }

    fn update_latch(&mut self, pin: u8, high: bool) -> I2cResult<()> {
        let Some(mask) = pin_mask(pin) else {
            trace!("Ignoring out-of-range pin {}", pin);
            return Ok(());
        };

        let current = self.read_register(Register::OLat)?;
        let updated = with_bits(current, mask, high);
        if updated != current {
            self.write_register(Register::OLat, updated)?;
        }
        Ok(())
    }

    /// Current level of a pin as reported by the GPIO register
    ///
    /// Input levels are subject to IPOL.
    pub fn read_pin(&mut self, pin: u8) -> I2cResult<bool> {
        let Some(mask) = pin_mask(pin) else {
            return Ok(false);
        };
        Ok(self.read_register(Register::Gpio)? & mask != 0)
    }

    /// Set a pin level with an unconditional read-modify-write of GPIO
    pub fn write_pin(&mut self, pin: u8, high: bool) -> I2cResult<()> {
        let Some(mask) = pin_mask(pin) else {
            return Ok(());
        };
        let port = self.read_register(Register::Gpio)?;
        self.write_register(Register::Gpio, with_bits(port, mask, high))
    }

    /// Enable or disable the internal pull-up on a pin
    pub fn set_pull_up(&mut self, pin: u8, enabled: bool) -> I2cResult<()> {
        let Some(mask) = pin_mask(pin) else {
            return Ok(());
        };
        let gppu = self.read_register(Register::Gppu)?;
        self.write_register(Register::Gppu, with_bits(gppu, mask, enabled))
    }

    /// Complement IPOL, flipping the reported polarity of every pin
    ///
    /// Calling it twice restores the original polarity.
    pub fn invert_polarity(&mut self) -> I2cResult<()> {
        let ipol = self.read_register(Register::IPol)?;
        self.write_register(Register::IPol, !ipol)
    }

    /// Read the whole port
    pub fn outputs(&mut self) -> I2cResult<u8> {
        self.read_register(Register::Gpio)
    }

    /// Write the whole port (lands in the output latch)
    pub fn set_outputs(&mut self, value: u8) -> I2cResult<()> {
        self.write_register(Register::Gpio, value)
    }

    /// Read IODIR (1 = input)
    pub fn direction(&mut self) -> I2cResult<u8> {
        self.read_register(Register::IoDir)
    }

    /// Write IODIR (1 = input)
    pub fn set_direction(&mut self, mask: u8) -> I2cResult<()> {
        self.write_register(Register::IoDir, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;
    use mcp23008_common::protocol::{GPIO_ALL_OUTPUT, PIN_COUNT};
    use mcp23008_common::types::Timing;

    fn initialized() -> (MockBus, Mcp23008<MockBus>) {
        let bus = MockBus::with_device(0x20);
        let mut dev = Mcp23008::new(bus.clone()).with_timing(Timing::immediate());
        dev.initialize(0x20, GPIO_ALL_OUTPUT, None).unwrap();
        bus.clear_log();
        (bus, dev)
    }

    #[test]
    fn test_set_pin_high_then_read() {
        for pin in 0..PIN_COUNT {
            let (_bus, mut dev) = initialized();
            dev.set_pin_high(pin).unwrap();
            assert!(dev.read_pin(pin).unwrap(), "pin {}", pin);
        }
    }

    #[test]
    fn test_set_pin_low_then_read() {
        for pin in 0..PIN_COUNT {
            let (_bus, mut dev) = initialized();
            dev.set_outputs(0xFF).unwrap();
            dev.set_pin_low(pin).unwrap();
            assert!(!dev.read_pin(pin).unwrap(), "pin {}", pin);
        }
    }

    #[test]
    fn test_set_pin_high_leaves_other_pins() {
        for p1 in 0..PIN_COUNT {
            let (_bus, mut dev) = initialized();
            dev.set_outputs(0b1010_0101).unwrap();
            let before: Vec<bool> = (0..PIN_COUNT).map(|p| dev.read_pin(p).unwrap()).collect();

            dev.set_pin_high(p1).unwrap();

            for p2 in (0..PIN_COUNT).filter(|&p| p != p1) {
                assert_eq!(dev.read_pin(p2).unwrap(), before[p2 as usize]);
            }
        }
    }

    #[test]
    fn test_set_pin_skips_redundant_write() {
        let (bus, mut dev) = initialized();
        dev.set_pin_high(2).unwrap();
        assert_eq!(bus.register_writes(0x20), vec![(0x0A, 0b0000_0100)]);

        bus.clear_log();
        dev.set_pin_high(2).unwrap();
        assert!(bus.register_writes(0x20).is_empty());
        assert_eq!(bus.transaction_count(), 2); // pointer write + read only

        dev.set_pin_low(5).unwrap();
        assert!(bus.register_writes(0x20).is_empty());
    }

    #[test]
    fn test_set_pin_reads_live_latch() {
        let (bus, mut dev) = initialized();
        dev.set_pin_high(0).unwrap();
        // another master changes the latch behind our back
        bus.set_register(0x20, Register::OLat, 0b1000_0001);

        dev.set_pin_high(1).unwrap();
        assert_eq!(bus.register(0x20, Register::OLat), 0b1000_0011);
    }

    #[test]
    fn test_write_pin_always_writes() {
        let (bus, mut dev) = initialized();
        dev.write_pin(3, true).unwrap();
        dev.write_pin(3, true).unwrap();
        assert_eq!(
            bus.register_writes(0x20),
            vec![(0x09, 0b0000_1000), (0x09, 0b0000_1000)]
        );
        assert!(dev.read_pin(3).unwrap());

        dev.write_pin(3, false).unwrap();
        assert!(!dev.read_pin(3).unwrap());
        assert_eq!(dev.last_output(), Some(0x00));
    }

    #[test]
    fn test_read_pin_sees_external_inputs() {
        let (bus, mut dev) = initialized();
        dev.set_direction(0b0000_0001).unwrap();
        bus.drive_pins(0x20, 0b0000_0001);
        assert!(dev.read_pin(0).unwrap());

        dev.invert_polarity().unwrap();
        assert!(!dev.read_pin(0).unwrap());
    }

    #[test]
    fn test_pull_up_round_trip() {
        for pin in 0..PIN_COUNT {
            let (bus, mut dev) = initialized();
            bus.set_register(0x20, Register::Gppu, 0b0110_0110);
            let original = bus.register(0x20, Register::Gppu);

            dev.set_pull_up(pin, true).unwrap();
            assert_ne!(bus.register(0x20, Register::Gppu) & (1 << pin), 0);
            dev.set_pull_up(pin, false).unwrap();

            let after = bus.register(0x20, Register::Gppu);
            assert_eq!(after & (1 << pin), 0);
            assert_eq!(after & !(1 << pin), original & !(1 << pin));
        }
    }

    #[test]
    fn test_invert_polarity_twice_restores() {
        let (bus, mut dev) = initialized();
        bus.set_register(0x20, Register::IPol, 0b0011_1100);

        dev.invert_polarity().unwrap();
        assert_eq!(bus.register(0x20, Register::IPol), 0b1100_0011);
        dev.invert_polarity().unwrap();
        assert_eq!(bus.register(0x20, Register::IPol), 0b0011_1100);
    }

    #[test]
    fn test_out_of_range_pins_touch_nothing() {
        let (bus, mut dev) = initialized();
        for pin in [8, 9, 100, 255] {
            dev.set_pin_high(pin).unwrap();
            dev.set_pin_low(pin).unwrap();
            dev.write_pin(pin, true).unwrap();
            dev.set_pull_up(pin, true).unwrap();
            assert!(!dev.read_pin(pin).unwrap());
        }
        assert_eq!(bus.transaction_count(), 0);
    }

    #[test]
    fn test_direction_round_trip() {
        let (bus, mut dev) = initialized();
        dev.set_direction(0xF0).unwrap();
        assert_eq!(dev.direction().unwrap(), 0xF0);
        assert_eq!(bus.register(0x20, Register::IoDir), 0xF0);
    }

    #[test]
    fn test_pin_op_on_missing_device_fails() {
        let bus = MockBus::new();
        let mut dev = Mcp23008::new(bus).with_timing(Timing::immediate());
        assert!(dev.set_pin_high(0).is_err());
        assert!(dev.read_pin(0).is_err());
    }
}
