//! Inertial-sensor sampling task.

use tokio::sync::broadcast;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::core::telemetry::readers::InertialSensor;
use crate::core::telemetry::smoother::SharedWindow;

/// Task that feeds the smoothing window from the inertial sensor.
///
/// Polling frequency: 100 ms, independent of the publication cycle.
/// A failed read is logged and retried on the next tick; the window is
/// not touched.
pub async fn sampler_task(
    mut sensor: InertialSensor,
    window: SharedWindow,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(Duration::from_millis(100));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sensor.read_temperature() {
                    Ok(temperature) => window.lock().push(temperature),
                    Err(e) => {
                        log::error!("Failed to read temperature from inertial sensor: {}", e);
                    }
                }
            }
            _ = shutdown.recv() => {
                break;
            }
        }
    }
}
