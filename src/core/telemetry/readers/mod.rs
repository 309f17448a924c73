//! Source-specific readers.
//!
//! Each reader adapts one hardware or OS source into typed optional
//! values. Failures stay inside the reader that hit them: a field that
//! could not be read or parsed is reported as absent, never as zero.

pub mod imu;
pub mod modem;
pub mod system;
pub mod ups;

pub use imu::InertialSensor;
pub use modem::ModemReader;
pub use ups::{SharedGauge, UpsGauge};
