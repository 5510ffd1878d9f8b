//! # PowerSteer Bridge
//!
//! Steer racing games with your phone.
//!
//! Receives `roll,accelerate,brake` frames and `RESTART` commands from the
//! PowerSteer phone app over UDP and drives a virtual joystick.

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use powersteer_bridge::bridge::{shutdown_signal, Bridge};
use powersteer_bridge::config::{Config, LoggingConfig};
use powersteer_bridge::joystick::axis_mapper::AxisMapper;
use powersteer_bridge::joystick::restart::RestartTrigger;
use powersteer_bridge::joystick::uinput::UinputJoystick;
use powersteer_bridge::udp::DatagramReceiver;

/// Log file name prefix inside `log_dir`
const LOG_FILE_PREFIX: &str = "powersteer-bridge.log";

/// Main entry point for PowerSteer Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, built-in defaults otherwise)
///    - Set up logging with tracing subscriber
///    - Create the virtual joystick and bind the UDP socket
///
/// 2. **Main Loop**
///    - Handle one datagram at a time until Ctrl+C
///
/// 3. **Shutdown**
///    - Log packet totals
///    - Drop the socket and destroy the virtual joystick
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be read or is invalid
/// - The virtual joystick cannot be created (no access to /dev/uinput)
/// - The UDP socket cannot be bound
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO powersteer_bridge: PowerSteer Bridge v0.1.0 starting (profile: combined)
/// INFO powersteer_bridge::joystick::uinput: Created virtual joystick "PowerSteer Virtual Joystick"
/// INFO powersteer_bridge::udp: Listening for data on 0.0.0.0:5005...
/// INFO powersteer_bridge::bridge: ROLL: 10, ACCEL: 1, BRAKE: 0 => X: 12743, Y: 0
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging);

    info!(
        "PowerSteer Bridge v{} starting (profile: {})",
        env!("CARGO_PKG_VERSION"),
        config.mapping.profile
    );

    let mapper = AxisMapper::from_config(&config.mapping);
    info!(
        "Roll clamp ±{}°, inverted: {}, pedals: {:?}",
        mapper.clamp_range(),
        mapper.invert_roll(),
        mapper.pedal_mode()
    );

    let joystick = UinputJoystick::create(&config.device.name)?;
    let receiver = DatagramReceiver::bind(config.listen_addr()?).await?;

    let restart = RestartTrigger::new(config.device.restart_button, config.restart_hold());
    let mut bridge = Bridge::new(joystick, mapper, restart)
        .with_status_interval(config.logging.status_interval_packets);

    info!("Press Ctrl+C to exit");

    bridge
        .run(&receiver, shutdown_signal(tokio::signal::ctrl_c()))
        .await;

    drop(receiver);
    drop(bridge);
    info!("Virtual joystick released");

    Ok(())
}

/// Console logging, plus a daily rolling file when `log_dir` is set
///
/// The returned guard flushes the file writer on drop and must live until exit.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(file_writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

