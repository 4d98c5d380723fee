//! Finding MCP23008 chips on a bus
//!
//! Scans the eight strappable addresses in ascending order with a
//! zero-length probe. This is first-match only: it does not detect
//! several chips sharing the bus.

use mcp23008_common::protocol::{ADDRESS_MAX, ADDRESS_MIN};
use tracing::{debug, warn};

use crate::bus::Bus;
use crate::device::Mcp23008;

/// First address in 0x20-0x27 that acknowledges, or `None`
pub fn discover<B: Bus + ?Sized>(bus: &mut B) -> Option<u8> {
    let found = (ADDRESS_MIN..=ADDRESS_MAX).find(|&address| bus.probe(address));
    match found {
        Some(address) => debug!("Found MCP23008 at 0x{:02X}", address),
        None => warn!(
            "No device acknowledged 0x{:02X}-0x{:02X}",
            ADDRESS_MIN, ADDRESS_MAX
        ),
    }
    found
}

/// Every address in 0x20-0x27 that acknowledges
pub fn scan<B: Bus + ?Sized>(bus: &mut B) -> Vec<u8> {
    let found: Vec<u8> = (ADDRESS_MIN..=ADDRESS_MAX)
        .filter(|&address| bus.probe(address))
        .collect();
    debug!("Scan found {} device(s): {:02X?}", found.len(), found);
    found
}

impl<B: Bus> Mcp23008<B> {
    /// Probe the bus this handle owns; the handle's address is not changed
    pub fn discover(&mut self) -> Option<u8> {
        discover(&mut self.bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBus, Transaction};
    use mcp23008_common::types::Timing;

    #[test]
    fn test_discover_single_device() {
        let mut bus = MockBus::with_device(0x24);
        assert_eq!(discover(&mut bus), Some(0x24));

        let probed: Vec<_> = bus.transactions();
        assert_eq!(
            probed,
            (0x20..=0x24)
                .map(|address| Transaction::Probe { address })
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_discover_empty_bus() {
        let mut bus = MockBus::new();
        assert_eq!(discover(&mut bus), None);
        assert_eq!(bus.transaction_count(), 8);
    }

    #[test]
    fn test_discover_returns_lowest_address() {
        let mut bus = MockBus::with_device(0x26);
        bus.add_device(0x21);
        assert_eq!(discover(&mut bus), Some(0x21));
    }

    #[test]
    fn test_discover_ignores_addresses_outside_range() {
        let mut bus = MockBus::with_device(0x1F);
        bus.add_device(0x28);
        assert_eq!(discover(&mut bus), None);
    }

    #[test]
    fn test_scan_lists_every_device() {
        let mut bus = MockBus::with_device(0x27);
        bus.add_device(0x20);
        bus.add_device(0x23);
        assert_eq!(scan(&mut bus), vec![0x20, 0x23, 0x27]);
        assert!(scan(&mut MockBus::new()).is_empty());
    }

    #[test]
    fn test_device_discover_keeps_address() {
        let bus = MockBus::with_device(0x25);
        let mut dev = Mcp23008::new(bus).with_timing(Timing::immediate());
        assert_eq!(dev.discover(), Some(0x25));
        assert_eq!(dev.address(), 0x20);
    }
}
