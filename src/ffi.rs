//! Raw interface to the Linux i2c-dev character device driver
//!
//! Ioctl request codes from the kernel's include/uapi/linux/i2c-dev.h.
//! The safe session type wrapping these lives in [`crate::bus`].

#![allow(dead_code)]

use libc::c_ulong;

// i2c-dev ioctl requests (from linux/i2c-dev.h)

/// Number of times a device address should be polled when not acknowledging
pub const I2C_RETRIES: c_ulong = 0x0701;
/// Set timeout in units of 10 ms
pub const I2C_TIMEOUT: c_ulong = 0x0702;
/// Use this peripheral address
pub const I2C_SLAVE: c_ulong = 0x0703;
/// 0 for 7-bit addresses, != 0 for 10-bit
pub const I2C_TENBIT: c_ulong = 0x0704;
/// Get the adapter functionality mask
pub const I2C_FUNCS: c_ulong = 0x0705;
/// Use this peripheral address even if it is already claimed by a driver
pub const I2C_SLAVE_FORCE: c_ulong = 0x0706;
/// Combined read/write transfer (one STOP only)
pub const I2C_RDWR: c_ulong = 0x0707;
/// SMBus transfer
pub const I2C_SMBUS: c_ulong = 0x0720;
