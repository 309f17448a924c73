//! Telemetry sampling, smoothing, change detection, and publication.
//!
//! A 10 Hz sampler feeds the temperature smoothing window while a 1 Hz
//! cycle reads every other source, assembles one immutable snapshot,
//! and publishes it to the room registry only when its content
//! changed.

pub mod gate;
pub mod metrics;
pub mod readers;
mod runtime;
pub mod smoother;
mod tasks;

pub use gate::{fingerprint, ChangeGate, Fingerprint};
pub use metrics::{LocationFix, ModemStatus, Payload, Snapshot, SystemStatus, UpsStatus};
pub use runtime::TelemetryRuntime;
pub use smoother::{SharedWindow, TemperatureWindow, WINDOW_SIZE};
