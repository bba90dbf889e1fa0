//! I2C bus session: handle lifetime and addressed register transactions
//!
//! [`I2cBus`] owns the open file handle to one i2c-dev character device and
//! performs register-level transactions against one bound peripheral. Every
//! transaction is synchronous and blocking; a failed transfer is reported
//! upward immediately and the caller decides whether to retry.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;

use crate::error::BusError;
use crate::ffi;

/// Register-level transaction interface for one bound peripheral.
///
/// The production implementation is [`I2cBus`]. The driver is generic over
/// this trait so it can be exercised against a simulated bus.
pub trait RegisterBus: Sized {
    /// Open the bus device at `path`
    fn open(path: &str) -> Result<Self, BusError>;

    /// Bind the peripheral address targeted by subsequent transactions.
    ///
    /// Must succeed before any register transaction.
    fn bind_peripheral(&mut self, address: u8) -> Result<(), BusError>;

    /// Write one register as a single atomic two-byte frame
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), BusError>;

    /// Select `register` and read exactly `buf.len()` bytes back.
    ///
    /// Both the address-select write and the read must fully complete; a
    /// partial transfer in either step is a failure.
    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Release the underlying handle. Idempotent.
    fn close(&mut self);
}

/// Session over one Linux i2c-dev character device.
///
/// The handle is held in an `Option` so a closed session can never be
/// double-closed: transactions after [`close`](RegisterBus::close) report
/// [`BusError::Closed`] instead of touching a stale descriptor. Dropping the
/// session releases the handle on early-failure paths.
#[derive(Debug)]
pub struct I2cBus {
    handle: Option<File>,
}

impl I2cBus {
    fn handle(&mut self) -> Result<&mut File, BusError> {
        self.handle.as_mut().ok_or(BusError::Closed)
    }
}

impl RegisterBus for I2cBus {
    fn open(path: &str) -> Result<Self, BusError> {
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| BusError::Open {
                path: path.to_string(),
                source,
            })?;

        log::debug!("opened I2C bus {}", path);
        Ok(Self {
            handle: Some(handle),
        })
    }

    fn bind_peripheral(&mut self, address: u8) -> Result<(), BusError> {
        let fd = self.handle()?.as_raw_fd();
        let rc = unsafe { libc::ioctl(fd, ffi::I2C_SLAVE, address as libc::c_ulong) };
        if rc < 0 {
            return Err(BusError::AddressBind {
                address,
                source: std::io::Error::last_os_error(),
            });
        }

        log::debug!("bound peripheral address 0x{:02X}", address);
        Ok(())
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        let frame = [register, value];
        match self.handle()?.write(&frame) {
            Ok(n) if n == frame.len() => {
                log::trace!("register 0x{:02X} <- 0x{:02X}", register, value);
                Ok(())
            }
            Ok(n) => Err(BusError::Write {
                register,
                expected: frame.len(),
                actual: n,
                source: None,
            }),
            Err(source) => Err(BusError::Write {
                register,
                expected: frame.len(),
                actual: 0,
                source: Some(source),
            }),
        }
    }

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        let handle = self.handle()?;

        // Select the read pointer with a one-byte write, then read back-to-back.
        match handle.write(&[register]) {
            Ok(1) => {}
            Ok(n) => {
                return Err(BusError::Write {
                    register,
                    expected: 1,
                    actual: n,
                    source: None,
                })
            }
            Err(source) => {
                return Err(BusError::Write {
                    register,
                    expected: 1,
                    actual: 0,
                    source: Some(source),
                })
            }
        }

        match handle.read(buf) {
            Ok(n) if n == buf.len() => {
                log::trace!("register 0x{:02X} -> {} bytes", register, n);
                Ok(())
            }
            Ok(n) => Err(BusError::Read {
                register,
                expected: buf.len(),
                actual: n,
                source: None,
            }),
            Err(source) => Err(BusError::Read {
                register,
                expected: buf.len(),
                actual: 0,
                source: Some(source),
            }),
        }
    }

    fn close(&mut self) {
        if self.handle.take().is_some() {
            log::debug!("closed I2C bus session");
        }
    }
}
