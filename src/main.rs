use anyhow::Result;
use clap::{Arg, Command};

use fieldcast::core::telemetry::readers::{InertialSensor, UpsGauge};
use fieldcast::core::telemetry::TelemetryRuntime;
use fieldcast::Config;

fn main() -> Result<()> {
    let matches = Command::new("fieldcast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Telemetry daemon for a mobile LiveKit streaming appliance")
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level filter (error, warn, info, debug, trace)")
                .default_value("debug"),
        )
        .get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .and_then(|value| value.parse().ok())
        .unwrap_or(log::LevelFilter::Debug);
    fieldcast::init_logging(level);

    log::debug!("Launching fieldcast (pid {})", std::process::id());

    let config = Config::from_env()?;
    log::debug!(
        "Registry {} room {} identity {}",
        config.domain,
        config.room,
        config.identity
    );

    // The modem and system readers degrade to absent fields when their
    // tools are missing; say so once here instead of every cycle.
    for tool in ["mmcli", "vcgencmd"] {
        if which::which(tool).is_err() {
            log::warn!("{} not found in PATH, its fields will stay absent", tool);
        }
    }

    // Mandatory hardware: failure to open either device aborts startup.
    let sensor = InertialSensor::open()?;
    let gauge = UpsGauge::open()?;

    let runtime = TelemetryRuntime::new(&config, sensor, gauge)?;

    let (stop_tx, stop_rx) = std::sync::mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    stop_rx.recv().ok();
    log::info!("Shutdown requested, stopping sampling tasks");
    runtime.shutdown();

    Ok(())
}
