//! Transport seams consumed by the driver
//!
//! The driver never talks to hardware directly. It needs a two-wire bus that
//! can address any 7-bit device, and optionally a digital output wired to the
//! chip's RESET input.

use std::io;

/// Blocking two-wire (I2C) bus master
///
/// A failed transaction (typically a missing ACK) is reported as an
/// `io::Error`. Implementations must not retry.
pub trait Bus {
    /// Write `bytes` to the device at `address` in one transaction
    fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()>;

    /// Read `buffer.len()` bytes from the device at `address`
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> io::Result<()>;

    /// Check whether a device acknowledges `address`
    ///
    /// Defaults to a zero-length write.
    fn probe(&mut self, address: u8) -> bool {
        self.write(address, &[]).is_ok()
    }
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()> {
        (**self).write(address, bytes)
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> io::Result<()> {
        (**self).read(address, buffer)
    }

    fn probe(&mut self, address: u8) -> bool {
        (**self).probe(address)
    }
}

/// Host-side output line connected to the chip's active-low RESET pin
///
/// Lines are `Send` so a device handle can be moved behind a mutex and
/// shared between threads.
pub trait ResetLine: Send {
    /// Release RESET (drive the line high)
    fn set_high(&mut self) -> io::Result<()>;

    /// Assert RESET (drive the line low)
    fn set_low(&mut self) -> io::Result<()>;
}
