// Fieldcast Library - Public API

// Re-export error types
pub mod error;
pub use error::{Result, TelemetryError};

// Module declarations
pub mod core;
pub mod livekit;

// Re-export commonly used types
pub use crate::core::config::Config;

// Initialize logging
pub fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
