//! Linux I2C gyroscope interface
//!
//! This library polls an MPU-6050 / ITG-3205 family gyroscope over a Linux
//! i2c-dev character device and converts burst register reads into angular
//! rates in degrees per second.
//!
//! # Quick Start
//!
//! ## Simple Data Reading
//! ```no_run
//! use i2c_gyro_interface::{I2cGyroscope, SensorConfig};
//!
//! let mut gyro = I2cGyroscope::initialize(SensorConfig::mpu6050())?;
//! let sample = gyro.read_sample()?;
//!
//! println!("Gyro x: {} Gyro y: {} Gyro z: {}", sample.x, sample.y, sample.z);
//! # Ok::<(), i2c_gyro_interface::GyroError>(())
//! ```
//!
//! ## Streaming at a Fixed Interval
//! ```no_run
//! use i2c_gyro_interface::{I2cGyroscope, SensorConfig, StreamControl};
//! use std::time::Duration;
//!
//! let mut gyro = I2cGyroscope::initialize(
//!     SensorConfig::itg3205().with_bus_path("/dev/i2c-1"),
//! )?;
//! let mut samples = Vec::new();
//!
//! // Collect 100 samples at 10 Hz
//! gyro.stream(Duration::from_millis(100), |sample| {
//!     samples.push(sample);
//!     if samples.len() >= 100 {
//!         StreamControl::Break
//!     } else {
//!         StreamControl::Continue
//!     }
//! })?;
//! # Ok::<(), i2c_gyro_interface::GyroError>(())
//! ```
//!
//! ## Bring Your Own Bus
//! ```no_run
//! use i2c_gyro_interface::{Gyroscope, I2cBus, RegisterBus, SensorConfig};
//!
//! let bus = I2cBus::open("/dev/i2c-1")?;
//! let mut gyro = Gyroscope::with_bus(bus, SensorConfig::mpu6050())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bus;
pub mod error;
mod ffi;
pub mod gyro;

// Re-export public API
pub use bus::{I2cBus, RegisterBus};
pub use error::{BusError, GyroError, InitStep, Result};
pub use gyro::{
    Gyroscope, GyroscopeSample, I2cGyroscope, RawSample, SensorConfig, StreamControl,
    DEFAULT_BUS_PATH,
};
