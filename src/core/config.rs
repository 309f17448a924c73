use std::env;

use crate::error::{Result, TelemetryError};

/// Remote registry identity, loaded once at startup.
///
/// Every field is mandatory; a missing variable aborts the launch
/// before any device is opened.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server domain, without scheme (`wss://`/`https://` are derived)
    pub domain: String,
    pub api_key: String,
    pub api_secret: String,
    /// Room whose metadata carries the telemetry snapshots
    pub room: String,
    /// Participant identity used as the token subject
    pub identity: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            domain: require("LIVEKIT_DOMAIN")?,
            api_key: require("LIVEKIT_API_KEY")?,
            api_secret: require("LIVEKIT_API_SECRET")?,
            room: require("LIVEKIT_ROOM")?,
            identity: require("LIVEKIT_IDENTITY")?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| TelemetryError::config(format!("{name} is not set")))
}
