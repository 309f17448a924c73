//! Tokio runtime and task wiring for the telemetry pipeline.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::readers::{InertialSensor, SharedGauge, UpsGauge};
use super::smoother::{SharedWindow, TemperatureWindow};
use super::tasks::{cycle_task, sampler_task};
use crate::core::config::Config;
use crate::livekit::RoomServiceClient;

/// Wrapper around the Tokio runtime for telemetry collection.
///
/// Owns the sampler and cycle tasks for the process lifetime; the
/// caller keeps the handle and asks for shutdown on exit.
pub struct TelemetryRuntime {
    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    /// Handle to the runtime (for shutdown)
    _runtime_handle: tokio::runtime::Runtime,
}

impl TelemetryRuntime {
    /// Create a new TelemetryRuntime with both background tasks
    /// spawned. The devices are opened by the caller so that open
    /// failures abort startup before any task runs.
    pub fn new(
        config: &Config,
        sensor: InertialSensor,
        gauge: UpsGauge,
    ) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("telemetry-worker")
            .build()?;

        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let window: SharedWindow = Arc::new(Mutex::new(TemperatureWindow::new()));
        let gauge: SharedGauge = Arc::new(Mutex::new(gauge));
        let client = Arc::new(RoomServiceClient::new(
            &config.domain,
            &config.api_key,
            &config.api_secret,
            &config.identity,
        ));

        runtime.spawn(sampler_task(
            sensor,
            Arc::clone(&window),
            shutdown_tx.subscribe(),
        ));

        runtime.spawn(cycle_task(
            client,
            config.room.clone(),
            gauge,
            window,
            shutdown_tx.subscribe(),
        ));

        Ok(Self {
            shutdown_tx,
            _runtime_handle: runtime,
        })
    }

    /// Shutdown the runtime gracefully.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        // Runtime will shutdown when dropped
    }
}
