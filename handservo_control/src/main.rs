//! # handservo
//!
//! Sweeps a servo while the first visible hand shows the trigger number of
//! fingers and centers it otherwise.
//!
//! # Usage
//!
//! ```bash
//! # Frames typed or piped on stdin, simulated servo
//! handservo
//!
//! # Replay a recorded session at ~30 fps
//! handservo --input session.txt --frame-interval-ms 33
//!
//! # Hardware PWM on a Raspberry Pi (built with --features rpi)
//! handservo --driver pwm
//!
//! # Check that the servo driver initializes, then exit
//! handservo --driver pwm --check
//! ```

#![deny(warnings)]

use clap::Parser;
use handservo_common::config::{AppConfig, ConfigError, ConfigOverrides, load_config_with};
use handservo_common::consts::DEFAULT_CONFIG_PATH;
use handservo_common::servo::CommandedPosition;
use handservo_control::perception::{FrameFeed, LineSource};
use handservo_control::{DecisionLoop, Session, SweepController};
use handservo_hal::{Actuator, DriverRegistry};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// handservo - finger-count driven servo sweep
#[derive(Parser, Debug)]
#[command(name = "handservo")]
#[command(version)]
#[command(about = "Finger-count driven servo sweep controller")]
#[command(long_about = None)]
struct Args {
    /// Path to the configuration file (defaults are used if it is missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Replay hand frames from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Minimum time between frames [ms] (0 = as fast as they arrive)
    #[arg(long, default_value_t = 0)]
    frame_interval_ms: u64,

    /// Servo driver (overrides [servo].driver)
    #[arg(short, long)]
    driver: Option<String>,

    /// Finger count that starts the sweep (overrides [decision].trigger_fingers)
    #[arg(short, long)]
    trigger: Option<u8>,

    /// Initialize, center and release the servo, then exit
    #[arg(long)]
    check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("handservo failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config first so its log level applies; errors are reported once tracing is up.
    let overrides = ConfigOverrides {
        driver: args.driver.clone(),
        trigger_fingers: args.trigger,
    };
    let loaded = load_config_with(&args.config, &overrides);
    let level = match &loaded {
        Ok(config) => config.shared.log_level.as_tracing(),
        Err(_) => Level::INFO,
    };
    setup_tracing(&args, level);

    info!("handservo v{} starting...", env!("CARGO_PKG_VERSION"));
    log_overrides(&overrides);

    let config = match loaded {
        Ok(config) => {
            info!("Loaded configuration from {}", args.config.display());
            config
        }
        Err(ConfigError::FileNotFound) => {
            warn!(
                "No configuration at {}, using defaults",
                args.config.display()
            );
            let mut config = AppConfig::default();
            overrides.apply(&mut config);
            config.validate()?;
            config
        }
        Err(e) => return Err(e.into()),
    };

    let registry = DriverRegistry::with_builtin_drivers();
    info!("Available servo drivers: {:?}", registry.list_drivers());

    if args.check {
        return run_check(&registry, &config);
    }

    let actuator = Actuator::open(&registry, &config.servo)?;
    let controller = SweepController::new(config.sweep.clone(), actuator);
    let decision = DecisionLoop::new(&config.decision);
    info!(
        "Show {} fingers to start the sweep, anything else to stop",
        decision.trigger_fingers()
    );

    let interval = Duration::from_millis(args.frame_interval_ms);
    let feed = match &args.input {
        Some(path) => FrameFeed::spawn(LineSource::from_path(path)?.with_frame_interval(interval))?,
        None => {
            info!("Reading hand frames from stdin ('q' to quit)");
            FrameFeed::spawn(LineSource::stdin().with_frame_interval(interval))?
        }
    };

    let mut session = Session::new(decision, controller);
    let running = session.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let summary = session.run(&feed)?;
    info!("{summary}");
    info!("handservo shutdown complete");
    Ok(())
}

/// Report which settings the command line replaced.
fn log_overrides(overrides: &ConfigOverrides) {
    if let Some(driver) = &overrides.driver {
        info!("Driver from CLI: {driver}");
    }
    if let Some(trigger) = overrides.trigger_fingers {
        info!("Trigger from CLI: {trigger} fingers");
    }
}

/// Installation self-test: bring the driver up, center, release.
fn run_check(
    registry: &DriverRegistry,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking servo driver '{}'", config.servo.driver);
    let actuator = Actuator::open(registry, &config.servo)?;

    actuator.command(CommandedPosition::CENTER)?;
    thread::sleep(config.sweep.shutdown_settle());
    if let Some(diag) = actuator.diagnostics() {
        info!(
            "Driver diagnostics: {} writes, last position {:?}, {}",
            diag.writes,
            diag.last_position,
            diag.custom.as_deref().unwrap_or("-")
        );
    }
    actuator.release()?;

    info!("Servo check passed ({})", actuator.driver_name());
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, default_level: Level) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        default_level
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
