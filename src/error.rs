//! Error types for the I2C gyroscope interface

use std::fmt;
use std::io;

use thiserror::Error;

/// Error type for bus session operations
#[derive(Error, Debug)]
pub enum BusError {
    /// The bus character device could not be opened
    #[error("failed to open I2C bus {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The peripheral address could not be bound on the bus
    #[error("failed to bind peripheral address 0x{address:02X}: {source}")]
    AddressBind {
        address: u8,
        #[source]
        source: io::Error,
    },

    /// A register write transferred fewer bytes than requested
    #[error("write to register 0x{register:02X} transferred {actual} of {expected} bytes")]
    Write {
        register: u8,
        expected: usize,
        actual: usize,
        #[source]
        source: Option<io::Error>,
    },

    /// A register read transferred fewer bytes than requested
    #[error("read from register 0x{register:02X} transferred {actual} of {expected} bytes")]
    Read {
        register: u8,
        expected: usize,
        actual: usize,
        #[source]
        source: Option<io::Error>,
    },

    /// Transaction attempted on a session whose handle has been released
    #[error("bus session is closed")]
    Closed,
}

/// Initialization step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Opening the bus character device
    Open,
    /// Binding the peripheral address
    Bind,
    /// Waking the sensor out of sleep mode
    Wake,
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            InitStep::Open => "opening the bus",
            InitStep::Bind => "binding the peripheral address",
            InitStep::Wake => "waking the sensor",
        };
        f.write_str(step)
    }
}

/// Error type for gyroscope driver operations
#[derive(Error, Debug)]
pub enum GyroError {
    /// Initialization stopped at the named step; later steps were not attempted
    #[error("initialization failed while {step}: {source}")]
    Init {
        step: InitStep,
        #[source]
        source: BusError,
    },

    /// A sample read failed; no sample was produced
    #[error("sample read failed: {0}")]
    Read(#[from] BusError),

    /// Operation on a driver that has been shut down
    #[error("gyroscope driver is shut down")]
    Closed,
}

/// Result type for gyroscope operations
pub type Result<T, E = GyroError> = std::result::Result<T, E>;
