//! Gyroscope reader - continuous angular rate acquisition and display
//!
//! Polls the gyroscope over the I2C bus and prints one line per sample.
//! Runs until Ctrl+C (or `--count` samples); a read failure is reported and
//! the loop keeps going, but a failed initialization aborts with a non-zero
//! exit status.

use clap::{Parser, ValueEnum};
use i2c_gyro_interface::{GyroError, I2cGyroscope, InitStep, SensorConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Model {
    /// MPU-6050 (powers up asleep, 131 LSB per °/s)
    Mpu6050,
    /// ITG-3205 (14.375 LSB per °/s)
    Itg3205,
}

#[derive(Parser, Debug)]
#[command(name = "gyro-reader")]
#[command(about = "Read gyroscope angular rates over I2C", long_about = None)]
struct Args {
    /// I2C bus character device
    #[arg(short, long, default_value = "/dev/i2c-1")]
    bus: String,

    /// Sensor model on the bus
    #[arg(short, long, value_enum, default_value = "mpu6050")]
    model: Model,

    /// Delay between samples in milliseconds
    #[arg(short, long, default_value = "100")]
    interval_ms: u64,

    /// Number of samples to read (runs until Ctrl+C if omitted)
    #[arg(short, long)]
    count: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let config = match args.model {
        Model::Mpu6050 => SensorConfig::mpu6050(),
        Model::Itg3205 => SensorConfig::itg3205(),
    }
    .with_bus_path(&args.bus);

    let mut gyro = match I2cGyroscope::initialize(config) {
        Ok(gyro) => gyro,
        Err(e @ GyroError::Init {
            step: InitStep::Open,
            ..
        }) => {
            eprintln!("Error: {}", e);
            eprintln!("Please check:");
            eprintln!("  1. The bus device exists (ls /dev/i2c-*)");
            eprintln!("  2. The i2c-dev kernel module is loaded");
            eprintln!("  3. You have permission to access the device (i2c group)");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Please check:");
            eprintln!("  1. The sensor is wired to SDA/SCL and powered");
            eprintln!("  2. The sensor answers at 0x68 (i2cdetect -y 1)");
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let interval = Duration::from_millis(args.interval_ms);
    let mut printed = 0u64;

    while running.load(Ordering::SeqCst) {
        match gyro.read_sample() {
            Ok(sample) => {
                println!(
                    "Gyro x: {:.2} Gyro y: {:.2} Gyro z: {:.2}",
                    sample.x, sample.y, sample.z
                );
                printed += 1;
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
            Err(e) => eprintln!("Read failed: {}", e),
        }

        thread::sleep(interval);
    }

    gyro.shutdown();
    Ok(())
}
