//! Device configuration and interrupt-on-change
//!
//! # Arming a pin
//!
//! `enable_interrupt_on_pin` runs three read-modify-write steps in a fixed
//! order:
//! 1. IODIR: make the pin an input
//! 2. GPINTEN: enable interrupt-on-change for the pin
//! 3. DEFVAL: set the compare level for the pin
//!
//! The sequence is not atomic. Between steps the chip is transiently
//! configured, which is harmless because the pin only starts raising
//! interrupts after step 2.
//!
//! # Servicing an interrupt
//!
//! INTF and INTCAP are latched by the chip until read, so a single
//! `refresh_interrupt_flags` + `refresh_interrupt_capture` per INT event is
//! enough. Read INTF first: reading INTCAP clears the interrupt.

use mcp23008_common::error::I2cResult;
use mcp23008_common::protocol::{
    IOCON_INTPOL, IOCON_ODR, IoCon, PIN_COUNT, Register, is_bit_high, pin_mask, with_bits,
};
use mcp23008_common::types::InterruptMode;
use tracing::debug;

use crate::bus::Bus;
use crate::device::Mcp23008;

impl<B: Bus> Mcp23008<B> {
    /// Replace IOCON with the given flags
    ///
    /// The whole register is written: reserved bits end up cleared. Use
    /// `write_raw` for merge semantics.
    pub fn set_device_config(&mut self, config: IoCon) -> I2cResult<()> {
        debug!("Writing IOCON {:?}", config);
        self.write_register(Register::IoCon, config.to_byte())
    }

    /// Read and decode IOCON
    pub fn device_config(&mut self) -> I2cResult<IoCon> {
        Ok(IoCon::from_byte(self.read_register(Register::IoCon)?))
    }

    /// Configure the INT output by OR-ing INTPOL/ODR into IOCON
    ///
    /// This only ever sets bits: passing `false` leaves an already-set flag
    /// in place, and SEQOP/DISSLW are never touched.
    pub fn arm_interrupt_source(&mut self, active_high: bool, open_drain: bool) -> I2cResult<()> {
        let mut bits = 0;
        bits = with_bits(bits, IOCON_INTPOL, active_high);
        bits = with_bits(bits, IOCON_ODR, open_drain);

        let iocon = self.read_register(Register::IoCon)?;
        self.write_register(Register::IoCon, iocon | bits)
    }

    /// Make `pin` an input and raise INT when it differs from `compare_level`
    ///
    /// See the module documentation for the step order. Other pins' bits in
    /// IODIR, GPINTEN and DEFVAL are preserved.
    pub fn enable_interrupt_on_pin(&mut self, pin: u8, compare_level: bool) -> I2cResult<()> {
        let Some(mask) = pin_mask(pin) else {
            return Ok(());
        };
        debug!(
            "Enabling interrupt on pin {} (compare level {})",
            pin, compare_level as u8
        );

        self.modify(Register::IoDir, mask, true)?;
        self.modify(Register::GpIntEn, mask, true)?;
        self.modify(Register::DefVal, mask, compare_level)
    }

    /// Stop `pin` from raising interrupts; direction is left alone
    pub fn disable_interrupt_on_pin(&mut self, pin: u8) -> I2cResult<()> {
        let Some(mask) = pin_mask(pin) else {
            return Ok(());
        };
        self.modify(Register::GpIntEn, mask, false)
    }

    /// Choose what an enabled pin is compared against (INTCON)
    pub fn set_interrupt_mode(&mut self, pin: u8, mode: InterruptMode) -> I2cResult<()> {
        let Some(mask) = pin_mask(pin) else {
            return Ok(());
        };
        self.modify(Register::IntCon, mask, mode == InterruptMode::CompareDefault)
    }

    /// Read INTCAP (port value at interrupt time) and cache it
    ///
    /// Clears the pending interrupt on the chip.
    pub fn refresh_interrupt_capture(&mut self) -> I2cResult<u8> {
        self.interrupt_capture = self.read_register(Register::IntCap)?;
        Ok(self.interrupt_capture)
    }

    /// Read INTF (pins that caused the interrupt) and cache it
    pub fn refresh_interrupt_flags(&mut self) -> I2cResult<u8> {
        self.interrupt_flags = self.read_register(Register::IntF)?;
        Ok(self.interrupt_flags)
    }

    /// INTCAP as of the last refresh
    pub fn interrupt_capture(&self) -> u8 {
        self.interrupt_capture
    }

    /// INTF as of the last refresh
    pub fn interrupt_flags(&self) -> u8 {
        self.interrupt_flags
    }

    /// Pins flagged in the cached INTF
    pub fn flagged_pins(&self) -> Vec<u8> {
        (0..PIN_COUNT)
            .filter(|&pin| is_bit_high(self.interrupt_flags, pin))
            .collect()
    }

    fn modify(&mut self, reg: Register, mask: u8, set: bool) -> I2cResult<()> {
        let value = self.read_register(reg)?;
        self.write_register(reg, with_bits(value, mask, set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;
    use mcp23008_common::protocol::{IOCON_DISSLW, IOCON_SEQOP};
    use mcp23008_common::types::Timing;

    fn initialized() -> (MockBus, Mcp23008<MockBus>) {
        let bus = MockBus::with_device(0x20);
        let mut dev = Mcp23008::new(bus.clone()).with_timing(Timing::immediate());
        dev.initialize(0x20, 0x00, None).unwrap();
        bus.clear_log();
        (bus, dev)
    }

    #[test]
    fn test_set_device_config_replaces_register() {
        let (bus, mut dev) = initialized();
        bus.set_register(0x20, Register::IoCon, 0b1111_1111);

        dev.set_device_config(IoCon {
            open_drain: true,
            sequential_disabled: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(bus.register(0x20, Register::IoCon), 0b0010_0100);
        assert_eq!(bus.transaction_count(), 1);
    }

    #[test]
    fn test_device_config_round_trip() {
        let (_bus, mut dev) = initialized();
        let config = IoCon {
            interrupt_active_high: true,
            hardware_address: true,
            slew_rate_disabled: true,
            ..Default::default()
        };
        dev.set_device_config(config).unwrap();
        assert_eq!(dev.device_config().unwrap(), config);
    }

    #[test]
    fn test_arm_interrupt_source_merges() {
        let (bus, mut dev) = initialized();
        bus.set_register(0x20, Register::IoCon, IOCON_SEQOP | IOCON_DISSLW);

        dev.arm_interrupt_source(true, false).unwrap();
        assert_eq!(
            bus.register(0x20, Register::IoCon),
            IOCON_SEQOP | IOCON_DISSLW | IOCON_INTPOL
        );

        dev.arm_interrupt_source(false, true).unwrap();
        assert_eq!(
            bus.register(0x20, Register::IoCon),
            IOCON_SEQOP | IOCON_DISSLW | IOCON_INTPOL | IOCON_ODR
        );
    }

    #[test]
    fn test_arm_interrupt_source_never_clears() {
        let (bus, mut dev) = initialized();
        bus.set_register(0x20, Register::IoCon, IOCON_INTPOL | IOCON_ODR);
        dev.arm_interrupt_source(false, false).unwrap();
        assert_eq!(
            bus.register(0x20, Register::IoCon),
            IOCON_INTPOL | IOCON_ODR
        );
    }

    #[test]
    fn test_enable_interrupt_on_pin_sets_three_registers() {
        let (bus, mut dev) = initialized();
        bus.set_register(0x20, Register::IoDir, 0b1000_0001);
        bus.set_register(0x20, Register::GpIntEn, 0b0100_0000);
        bus.set_register(0x20, Register::DefVal, 0b0000_0010);

        dev.enable_interrupt_on_pin(3, true).unwrap();

        assert_eq!(bus.register(0x20, Register::IoDir), 0b1000_1001);
        assert_eq!(bus.register(0x20, Register::GpIntEn), 0b0100_1000);
        assert_eq!(bus.register(0x20, Register::DefVal), 0b0000_1010);
    }

    #[test]
    fn test_enable_interrupt_on_pin_order() {
        let (bus, mut dev) = initialized();
        dev.enable_interrupt_on_pin(6, false).unwrap();

        let order: Vec<u8> = bus
            .register_writes(0x20)
            .into_iter()
            .map(|(reg, _)| reg)
            .collect();
        assert_eq!(
            order,
            vec![
                Register::IoDir.to_byte(),
                Register::GpIntEn.to_byte(),
                Register::DefVal.to_byte()
            ]
        );
    }

    #[test]
    fn test_enable_interrupt_compare_low_clears_defval_bit() {
        let (bus, mut dev) = initialized();
        bus.set_register(0x20, Register::DefVal, 0xFF);
        dev.enable_interrupt_on_pin(0, false).unwrap();
        assert_eq!(bus.register(0x20, Register::DefVal), 0xFE);
    }

    #[test]
    fn test_interrupt_mode_and_disable() {
        let (bus, mut dev) = initialized();
        dev.set_interrupt_mode(4, InterruptMode::CompareDefault)
            .unwrap();
        assert_eq!(bus.register(0x20, Register::IntCon), 0b0001_0000);
        dev.set_interrupt_mode(4, InterruptMode::AnyChange).unwrap();
        assert_eq!(bus.register(0x20, Register::IntCon), 0);

        dev.enable_interrupt_on_pin(4, true).unwrap();
        dev.disable_interrupt_on_pin(4).unwrap();
        assert_eq!(bus.register(0x20, Register::GpIntEn), 0);
        assert_eq!(bus.register(0x20, Register::IoDir), 0b0001_0000);
    }

    #[test]
    fn test_out_of_range_pin_is_ignored() {
        let (bus, mut dev) = initialized();
        dev.enable_interrupt_on_pin(8, true).unwrap();
        dev.enable_interrupt_on_pin(255, false).unwrap();
        dev.disable_interrupt_on_pin(8).unwrap();
        dev.set_interrupt_mode(200, InterruptMode::AnyChange).unwrap();
        assert_eq!(bus.transaction_count(), 0);
    }

    #[test]
    fn test_interrupt_capture_flow() {
        let (bus, mut dev) = initialized();
        dev.arm_interrupt_source(false, true).unwrap();
        dev.enable_interrupt_on_pin(3, true).unwrap();
        dev.set_interrupt_mode(3, InterruptMode::CompareDefault)
            .unwrap();

        // pin 3 reads low, which differs from its compare level
        bus.drive_pins(0x20, 0b0000_0001);

        assert_eq!(dev.refresh_interrupt_flags().unwrap(), 0b0000_1000);
        assert_eq!(dev.flagged_pins(), vec![3]);
        let captured = dev.refresh_interrupt_capture().unwrap();
        assert!(!is_bit_high(captured, 3));
        assert_eq!(dev.interrupt_capture(), captured);

        // latched state is cleared by the INTCAP read
        assert_eq!(dev.refresh_interrupt_flags().unwrap(), 0);
        assert!(dev.flagged_pins().is_empty());
    }

    #[test]
    fn test_cached_values_start_empty() {
        let (_bus, dev) = initialized();
        assert_eq!(dev.interrupt_capture(), 0);
        assert_eq!(dev.interrupt_flags(), 0);
    }
}
