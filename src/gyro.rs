//! Gyroscope driver: initialization sequencing and sample acquisition

use std::thread;
use std::time::{Duration, Instant};

use crate::bus::{I2cBus, RegisterBus};
use crate::error::{GyroError, InitStep, Result};

// Shared 7-bit peripheral address (both supported models)
const SENSOR_ADDRESS: u8 = 0x68;

// Register addresses
const REG_PWR_MGMT_1: u8 = 0x6B; // Power management
const REG_GYRO_XOUT_H_MPU6050: u8 = 0x43; // Gyro X-axis high byte (MPU-6050)
const REG_GYRO_XOUT_H_ITG3205: u8 = 0x1D; // Gyro X-axis high byte (ITG-3205)

// PWR_MGMT_1 value that clears the sleep bit
const PWR_MGMT_MEASURE: u8 = 0x00;

// Gyroscope sensitivity in LSB per degree/second
const GYRO_SCALE_MPU6050: f32 = 131.0; // +/-250°/s range
const GYRO_SCALE_ITG3205: f32 = 14.375;

/// Bytes in one burst read of the three gyro axes
const SAMPLE_LEN: usize = 6;

/// Default bus character device
pub const DEFAULT_BUS_PATH: &str = "/dev/i2c-1";

/// Sensor model parameters for one gyroscope on the bus.
///
/// Model selection is data: the two supported models share one register
/// layout and differ only in output register base, sensitivity, and whether
/// they power up asleep.
#[derive(Debug, Clone)]
pub struct SensorConfig {
    /// Bus character device path; passed to open verbatim, never parsed
    pub bus_path: String,
    /// 7-bit peripheral address
    pub address: u8,
    /// First register of the 6-byte gyro output block
    pub data_register: u8,
    /// Sensitivity in LSB per degree/second
    pub scale_factor: f32,
    /// Whether the model powers up in sleep mode and needs a wake write
    pub needs_wake: bool,
}

impl SensorConfig {
    /// MPU-6050: powers up asleep, 131 LSB/(°/s) at the default ±250°/s range
    pub fn mpu6050() -> Self {
        Self {
            bus_path: DEFAULT_BUS_PATH.to_string(),
            address: SENSOR_ADDRESS,
            data_register: REG_GYRO_XOUT_H_MPU6050,
            scale_factor: GYRO_SCALE_MPU6050,
            needs_wake: true,
        }
    }

    /// ITG-3205: live after power-up, 14.375 LSB/(°/s)
    pub fn itg3205() -> Self {
        Self {
            bus_path: DEFAULT_BUS_PATH.to_string(),
            address: SENSOR_ADDRESS,
            data_register: REG_GYRO_XOUT_H_ITG3205,
            scale_factor: GYRO_SCALE_ITG3205,
            needs_wake: false,
        }
    }

    /// Replace the bus device path
    pub fn with_bus_path(mut self, path: impl Into<String>) -> Self {
        self.bus_path = path.into();
        self
    }
}

/// Control flow for streaming operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Continue streaming
    Continue,
    /// Stop streaming
    Break,
}

/// One decoded burst read: raw signed axis counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// X-axis (raw value)
    pub x: i16,
    /// Y-axis (raw value)
    pub y: i16,
    /// Z-axis (raw value)
    pub z: i16,
}

impl RawSample {
    /// Decode a 6-byte burst read, most-significant byte first per axis.
    pub fn from_be_bytes(buf: [u8; SAMPLE_LEN]) -> Self {
        Self {
            x: i16::from_be_bytes([buf[0], buf[1]]),
            y: i16::from_be_bytes([buf[2], buf[3]]),
            z: i16::from_be_bytes([buf[4], buf[5]]),
        }
    }

    /// Convert raw counts to degrees/second
    pub fn to_dps(self, scale_factor: f32) -> GyroscopeSample {
        GyroscopeSample {
            x: self.x as f32 / scale_factor,
            y: self.y as f32 / scale_factor,
            z: self.z as f32 / scale_factor,
        }
    }
}

/// Angular rate on three axes in degrees/second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroscopeSample {
    /// X-axis rate (°/s)
    pub x: f32,
    /// Y-axis rate (°/s)
    pub y: f32,
    /// Z-axis rate (°/s)
    pub z: f32,
}

/// Gyroscope driver over a Linux i2c-dev bus session
pub type I2cGyroscope = Gyroscope<I2cBus>;

/// Gyroscope driver.
///
/// Sequences the bus session calls needed to bring one gyroscope online and
/// to produce one calibrated sample per read. Read failures do not demote the
/// driver; the caller may retry reads for as long as the session is open.
#[derive(Debug)]
pub struct Gyroscope<B> {
    config: SensorConfig,
    bus: Option<B>,
}

impl<B: RegisterBus> Gyroscope<B> {
    /// Open the bus at the configured device path, bind the peripheral
    /// address, and wake the sensor if the model requires it.
    ///
    /// The first failing step short-circuits the rest and is named in the
    /// returned error; a partially-initialized bus handle is released.
    ///
    /// # Example
    /// ```no_run
    /// use i2c_gyro_interface::{I2cGyroscope, SensorConfig};
    ///
    /// let mut gyro = I2cGyroscope::initialize(SensorConfig::mpu6050())?;
    /// let sample = gyro.read_sample()?;
    /// println!("Gyro x: {} Gyro y: {} Gyro z: {}", sample.x, sample.y, sample.z);
    /// # Ok::<(), i2c_gyro_interface::GyroError>(())
    /// ```
    pub fn initialize(config: SensorConfig) -> Result<Self> {
        let bus = B::open(&config.bus_path).map_err(|source| GyroError::Init {
            step: InitStep::Open,
            source,
        })?;

        Self::with_bus(bus, config)
    }

    /// Initialize against an already-open bus session (bind + optional wake).
    pub fn with_bus(mut bus: B, config: SensorConfig) -> Result<Self> {
        bus.bind_peripheral(config.address)
            .map_err(|source| GyroError::Init {
                step: InitStep::Bind,
                source,
            })?;

        if config.needs_wake {
            // The sensor powers up asleep and reports stale data until the
            // sleep bit is cleared.
            bus.write_register(REG_PWR_MGMT_1, PWR_MGMT_MEASURE)
                .map_err(|source| GyroError::Init {
                    step: InitStep::Wake,
                    source,
                })?;
        }

        log::info!(
            "gyroscope ready on {} (address 0x{:02X})",
            config.bus_path,
            config.address
        );

        Ok(Self {
            config,
            bus: Some(bus),
        })
    }

    /// Sensor parameters this driver was initialized with
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Read one calibrated sample.
    ///
    /// Issues one 6-byte burst read at the gyro output register, decodes the
    /// bytes pairwise into signed 16-bit values, and scales them into
    /// degrees/second. On failure the error propagates and no sample is
    /// produced.
    pub fn read_sample(&mut self) -> Result<GyroscopeSample> {
        let bus = self.bus.as_mut().ok_or(GyroError::Closed)?;

        let mut raw = [0u8; SAMPLE_LEN];
        bus.read_registers(self.config.data_register, &mut raw)?;

        Ok(RawSample::from_be_bytes(raw).to_dps(self.config.scale_factor))
    }

    /// Close the bus session. Safe to call multiple times; reads after
    /// shutdown report [`GyroError::Closed`].
    pub fn shutdown(&mut self) {
        if let Some(mut bus) = self.bus.take() {
            bus.close();
            log::info!("gyroscope shut down");
        }
    }

    /// Read samples at a fixed interval, invoking `callback` for each one.
    ///
    /// The callback returns [`StreamControl::Break`] to stop the stream.
    /// A read failure stops the stream and propagates; the caller decides
    /// whether to resume.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of samples delivered before stopping
    ///
    /// # Example
    /// ```no_run
    /// use i2c_gyro_interface::{I2cGyroscope, SensorConfig, StreamControl};
    /// use std::time::Duration;
    ///
    /// let mut gyro = I2cGyroscope::initialize(SensorConfig::itg3205())?;
    /// let mut peak = 0.0f32;
    ///
    /// gyro.stream(Duration::from_millis(100), |sample| {
    ///     peak = peak.max(sample.x.abs());
    ///     if peak > 100.0 {
    ///         StreamControl::Break
    ///     } else {
    ///         StreamControl::Continue
    ///     }
    /// })?;
    /// # Ok::<(), i2c_gyro_interface::GyroError>(())
    /// ```
    pub fn stream<F>(&mut self, interval: Duration, mut callback: F) -> Result<u64>
    where
        F: FnMut(GyroscopeSample) -> StreamControl,
    {
        let mut sample_count = 0u64;
        let mut next_sample_time = Instant::now();

        loop {
            let sample = self.read_sample()?;
            sample_count += 1;

            if callback(sample) == StreamControl::Break {
                break;
            }

            // Wait until the next sample time; if we're running behind,
            // continue immediately.
            next_sample_time += interval;
            let now = Instant::now();
            if next_sample_time > now {
                thread::sleep(next_sample_time - now);
            }
        }

        Ok(sample_count)
    }

    /// Collect a fixed number of samples at the given interval.
    pub fn collect_samples(
        &mut self,
        interval: Duration,
        num_samples: usize,
    ) -> Result<Vec<GyroscopeSample>> {
        let mut samples = Vec::with_capacity(num_samples);

        self.stream(interval, |sample| {
            samples.push(sample);
            if samples.len() >= num_samples {
                StreamControl::Break
            } else {
                StreamControl::Continue
            }
        })?;

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Bind(u8),
        Write(u8, u8),
        Read(u8, usize),
    }

    #[derive(Debug, Default)]
    struct BusLog {
        calls: Vec<Call>,
        closes: u32,
    }

    #[derive(Debug)]
    enum ReadResponse {
        Bytes([u8; SAMPLE_LEN]),
        Short(usize),
    }

    /// Simulated bus: records calls, serves scripted responses.
    #[derive(Debug)]
    struct ScriptedBus {
        log: Rc<RefCell<BusLog>>,
        fail_bind: bool,
        fail_write: bool,
        response: ReadResponse,
    }

    impl ScriptedBus {
        fn new(log: Rc<RefCell<BusLog>>) -> Self {
            Self {
                log,
                fail_bind: false,
                fail_write: false,
                response: ReadResponse::Bytes([0; SAMPLE_LEN]),
            }
        }
    }

    impl RegisterBus for ScriptedBus {
        fn open(_path: &str) -> Result<Self, BusError> {
            Ok(Self::new(Rc::default()))
        }

        fn bind_peripheral(&mut self, address: u8) -> Result<(), BusError> {
            self.log.borrow_mut().calls.push(Call::Bind(address));
            if self.fail_bind {
                return Err(BusError::AddressBind {
                    address,
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            Ok(())
        }

        fn write_register(&mut self, register: u8, value: u8) -> Result<(), BusError> {
            self.log.borrow_mut().calls.push(Call::Write(register, value));
            if self.fail_write {
                return Err(BusError::Write {
                    register,
                    expected: 2,
                    actual: 0,
                    source: None,
                });
            }
            Ok(())
        }

        fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
            self.log.borrow_mut().calls.push(Call::Read(register, buf.len()));
            match &self.response {
                ReadResponse::Bytes(bytes) => {
                    buf.copy_from_slice(bytes);
                    Ok(())
                }
                ReadResponse::Short(actual) => Err(BusError::Read {
                    register,
                    expected: buf.len(),
                    actual: *actual,
                    source: None,
                }),
            }
        }

        fn close(&mut self) {
            self.log.borrow_mut().closes += 1;
        }
    }

    /// Simulated bus whose device node cannot be opened.
    #[derive(Debug)]
    struct DeniedBus;

    impl RegisterBus for DeniedBus {
        fn open(path: &str) -> Result<Self, BusError> {
            Err(BusError::Open {
                path: path.to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        }

        fn bind_peripheral(&mut self, _address: u8) -> Result<(), BusError> {
            panic!("bind attempted after failed open");
        }

        fn write_register(&mut self, _register: u8, _value: u8) -> Result<(), BusError> {
            panic!("write attempted after failed open");
        }

        fn read_registers(&mut self, _register: u8, _buf: &mut [u8]) -> Result<(), BusError> {
            panic!("read attempted after failed open");
        }

        fn close(&mut self) {}
    }

    fn scripted(log: &Rc<RefCell<BusLog>>) -> ScriptedBus {
        ScriptedBus::new(Rc::clone(log))
    }

    #[test]
    fn decode_is_big_endian_signed() {
        let raw = RawSample::from_be_bytes([0x03, 0xE8, 0x00, 0x00, 0xFF, 0x38]);
        assert_eq!(raw, RawSample { x: 1000, y: 0, z: -200 });
    }

    #[test]
    fn decode_round_trips_full_int16_range_endpoints() {
        for value in [i16::MIN, -200, -1, 0, 1, 1000, i16::MAX] {
            let [hi, lo] = value.to_be_bytes();
            let raw = RawSample::from_be_bytes([hi, lo, hi, lo, hi, lo]);
            assert_eq!(raw.x, value);
            assert_eq!(raw.y, value);
            assert_eq!(raw.z, value);
        }
    }

    #[test]
    fn raw_131_at_scale_131_is_one_dps() {
        let sample = RawSample { x: 131, y: -131, z: 0 }.to_dps(131.0);
        assert_eq!(sample.x, 1.0);
        assert_eq!(sample.y, -1.0);
        assert_eq!(sample.z, 0.0);
    }

    #[test]
    fn read_sample_decodes_and_scales() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let mut bus = scripted(&log);
        bus.response = ReadResponse::Bytes([0x03, 0xE8, 0x00, 0x00, 0xFF, 0x38]);

        let mut gyro = Gyroscope::with_bus(bus, SensorConfig::itg3205()).unwrap();
        let sample = gyro.read_sample().unwrap();

        assert!((sample.x - 1000.0 / 14.375).abs() < 1e-3);
        assert_eq!(sample.y, 0.0);
        assert!((sample.z - (-200.0 / 14.375)).abs() < 1e-3);

        // The burst read targets the configured output register.
        assert!(log
            .borrow()
            .calls
            .contains(&Call::Read(0x1D, SAMPLE_LEN)));
    }

    #[test]
    fn short_read_propagates_without_fabricating_a_sample() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let mut bus = scripted(&log);
        bus.response = ReadResponse::Short(2);

        let mut gyro = Gyroscope::with_bus(bus, SensorConfig::itg3205()).unwrap();
        let err = gyro.read_sample().unwrap_err();

        assert!(matches!(
            err,
            GyroError::Read(BusError::Read {
                expected: SAMPLE_LEN,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn bind_failure_stops_initialization() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let mut bus = scripted(&log);
        bus.fail_bind = true;

        let err = Gyroscope::with_bus(bus, SensorConfig::mpu6050()).unwrap_err();

        assert!(matches!(
            err,
            GyroError::Init {
                step: InitStep::Bind,
                source: BusError::AddressBind { address: 0x68, .. },
            }
        ));
        // No register traffic after the failed bind.
        assert_eq!(log.borrow().calls, vec![Call::Bind(0x68)]);
    }

    #[test]
    fn open_failure_stops_initialization() {
        let err = Gyroscope::<DeniedBus>::initialize(SensorConfig::mpu6050()).unwrap_err();

        assert!(matches!(
            err,
            GyroError::Init {
                step: InitStep::Open,
                source: BusError::Open { .. },
            }
        ));
    }

    #[test]
    fn wake_is_written_for_sleeping_models_only() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        Gyroscope::with_bus(scripted(&log), SensorConfig::mpu6050()).unwrap();
        assert_eq!(
            log.borrow().calls,
            vec![Call::Bind(0x68), Call::Write(0x6B, 0x00)]
        );

        let log = Rc::new(RefCell::new(BusLog::default()));
        Gyroscope::with_bus(scripted(&log), SensorConfig::itg3205()).unwrap();
        assert_eq!(log.borrow().calls, vec![Call::Bind(0x68)]);
    }

    #[test]
    fn wake_failure_reports_wake_step() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let mut bus = scripted(&log);
        bus.fail_write = true;

        let err = Gyroscope::with_bus(bus, SensorConfig::mpu6050()).unwrap_err();

        assert!(matches!(
            err,
            GyroError::Init {
                step: InitStep::Wake,
                source: BusError::Write { register: 0x6B, .. },
            }
        ));
    }

    #[test]
    fn shutdown_is_idempotent_and_closes_once() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let mut gyro = Gyroscope::with_bus(scripted(&log), SensorConfig::itg3205()).unwrap();

        gyro.shutdown();
        gyro.shutdown();

        assert_eq!(log.borrow().closes, 1);
        assert!(matches!(gyro.read_sample(), Err(GyroError::Closed)));
    }

    #[test]
    fn stream_delivers_until_callback_breaks() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let mut bus = scripted(&log);
        bus.response = ReadResponse::Bytes([0x00, 0x83, 0x00, 0x00, 0x00, 0x00]);

        let mut gyro = Gyroscope::with_bus(bus, SensorConfig::mpu6050()).unwrap();

        let mut seen = 0u32;
        let delivered = gyro
            .stream(Duration::from_millis(0), |sample| {
                assert_eq!(sample.x, 1.0); // 131 / 131.0
                seen += 1;
                if seen == 3 {
                    StreamControl::Break
                } else {
                    StreamControl::Continue
                }
            })
            .unwrap();

        assert_eq!(delivered, 3);
    }

    #[test]
    fn collect_samples_returns_requested_count() {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let mut gyro = Gyroscope::with_bus(scripted(&log), SensorConfig::mpu6050()).unwrap();

        let samples = gyro.collect_samples(Duration::from_millis(0), 5).unwrap();
        assert_eq!(samples.len(), 5);
    }
}
