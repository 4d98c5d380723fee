//! Linux transports: i2c-dev bus and sysfs reset line
//!
//! `LinuxBus` wraps a single `/dev/i2c-N` handle and re-targets the slave
//! address whenever a transaction goes to a different device, so one bus
//! handle can serve discovery and any chip in 0x20-0x27.
//!
//! This module is only available on Linux targets.

#![cfg(target_os = "linux")]

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use mcp23008_common::error::{I2cError, I2cResult};
use mcp23008_common::protocol::ADDRESS_MIN;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::bus::{Bus, ResetLine};

/// Root of the legacy sysfs GPIO interface
const SYSFS_GPIO: &str = "/sys/class/gpio";

/// Upper bound on waiting for udev to create and chown an exported GPIO
const EXPORT_TIMEOUT: Duration = Duration::from_millis(500);

/// Interval between attempts while waiting for an exported GPIO
const EXPORT_POLL: Duration = Duration::from_millis(10);

/// I2C bus master backed by Linux i2c-dev
pub struct LinuxBus {
    device: LinuxI2CDevice,
    bus: u8,
    address: u8,
}

impl LinuxBus {
    /// Open `/dev/i2c-{bus}`
    ///
    /// # Errors
    /// Returns `I2cError::DeviceOpen` if the device node cannot be opened
    /// (missing i2c-dev module, permissions, wrong bus number).
    pub fn open(bus: u8) -> I2cResult<Self> {
        let path = format!("/dev/i2c-{}", bus);
        let device = LinuxI2CDevice::new(&path, ADDRESS_MIN as u16).map_err(|e| {
            I2cError::DeviceOpen {
                device: path.clone(),
                source: io::Error::other(e),
            }
        })?;
        debug!("Opened {}", path);

        Ok(Self {
            device,
            bus,
            address: ADDRESS_MIN,
        })
    }

    /// Bus number this handle was opened on
    pub fn bus(&self) -> u8 {
        self.bus
    }

    fn select(&mut self, address: u8) -> io::Result<()> {
        if address != self.address {
            self.device
                .set_slave_address(address as u16)
                .map_err(io::Error::other)?;
            self.address = address;
        }
        Ok(())
    }
}

impl Bus for LinuxBus {
    fn write(&mut self, address: u8, bytes: &[u8]) -> io::Result<()> {
        self.select(address)?;
        self.device.write(bytes).map_err(io::Error::other)
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> io::Result<()> {
        self.select(address)?;
        self.device.read(buffer).map_err(io::Error::other)
    }

    /// SMBus quick write, as used by `i2cdetect`
    fn probe(&mut self, address: u8) -> bool {
        self.select(address).is_ok() && self.device.smbus_write_quick(false).is_ok()
    }
}

/// RESET line driven through `/sys/class/gpio/gpioN`
#[derive(Debug)]
pub struct SysfsResetLine {
    gpio: u32,
    value: PathBuf,
}

impl SysfsResetLine {
    /// Export `gpio` if needed and configure it as an output driven high
    pub fn open(gpio: u32) -> io::Result<Self> {
        let dir = PathBuf::from(format!("{}/gpio{}", SYSFS_GPIO, gpio));
        if !dir.exists() {
            fs::write(format!("{}/export", SYSFS_GPIO), gpio.to_string())?;
        }
        // "high" switches to output without glitching RESET low
        retry_until(EXPORT_TIMEOUT, || fs::write(dir.join("direction"), "high"))?;
        debug!("Using GPIO {} as reset line", gpio);

        Ok(Self {
            gpio,
            value: dir.join("value"),
        })
    }

    /// GPIO number of the line
    pub fn gpio(&self) -> u32 {
        self.gpio
    }
}

impl ResetLine for SysfsResetLine {
    fn set_high(&mut self) -> io::Result<()> {
        fs::write(&self.value, "1")
    }

    fn set_low(&mut self) -> io::Result<()> {
        fs::write(&self.value, "0")
    }
}

/// Retry `attempt` while it fails with NotFound or PermissionDenied
///
/// Other errors, and the last transient one after `timeout`, are returned.
fn retry_until<T>(timeout: Duration, mut attempt: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let deadline = Instant::now() + timeout;
    loop {
        match attempt() {
            Err(e) if is_transient(&e) && Instant::now() < deadline => thread::sleep(EXPORT_POLL),
            result => return result,
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_waits_for_node_to_appear() {
        let mut calls = 0;
        let result = retry_until(EXPORT_TIMEOUT, || {
            calls += 1;
            match calls {
                1 => Err(io::Error::from(io::ErrorKind::NotFound)),
                2 => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
                _ => Ok(calls),
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_retry_returns_other_errors_immediately() {
        let mut calls = 0;
        let result: io::Result<()> = retry_until(EXPORT_TIMEOUT, || {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::InvalidInput))
        });
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retry_gives_up_after_timeout() {
        let timeout = Duration::from_millis(50);
        let start = Instant::now();
        let result: io::Result<()> =
            retry_until(timeout, || Err(io::Error::from(io::ErrorKind::NotFound)));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
        assert!(start.elapsed() >= timeout);
    }
}
