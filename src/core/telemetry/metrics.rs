use serde::Serialize;

/// Complete telemetry snapshot for one publication cycle.
///
/// Every leaf field is optional: a source that failed to read or parse
/// reports `None`, which serializes as JSON `null` so a missing sensor
/// never masquerades as a real zero. A snapshot is never mutated after
/// assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub modem: ModemStatus,
    pub location: LocationFix,
    pub system: SystemStatus,
    pub ups: UpsStatus,
    /// Smoothed inertial-sensor temperature (°C), one decimal
    pub temp: Option<f32>,
}

/// Cellular modem state as reported by the modem manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModemStatus {
    /// Access technologies, kept as the raw JSON value (the manager
    /// reports either a string or a list depending on the bearer)
    pub tech: Option<serde_json::Value>,
    /// Signal quality, 0-100
    pub signal: Option<i64>,
}

/// GPS fix extracted from the modem's location report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationFix {
    pub long: Option<f32>,
    pub lat: Option<f32>,
    /// Altitude in meters
    pub alt: Option<f32>,
    /// Ground speed in km/h
    pub speed: Option<f32>,
    /// Satellites in use
    pub sat: Option<f32>,
    /// Horizontal dilution of precision
    pub hdop: Option<f32>,
}

/// Board-level state: power draw, CPU temperature, fan, load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemStatus {
    pub watts: Option<f32>,
    pub temperature: Option<f32>,
    /// Fan speed in RPM
    pub fan: Option<f32>,
    /// CPU busy percentage
    pub load: Option<f32>,
}

/// UPS fuel gauge state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpsStatus {
    pub voltage: Option<f32>,
    pub capacity: Option<f32>,
}

/// Wire payload: the snapshot fields plus the publication timestamp.
///
/// The timestamp lives here rather than on [`Snapshot`] so that
/// change detection never sees it.
#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    #[serde(flatten)]
    pub snapshot: &'a Snapshot,
    /// Unix seconds at publication
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let json = serde_json::to_value(Snapshot::default()).unwrap();
        assert!(json["modem"]["tech"].is_null());
        assert!(json["location"]["lat"].is_null());
        assert!(json["system"]["watts"].is_null());
        assert!(json["ups"]["voltage"].is_null());
        assert!(json["temp"].is_null());
    }

    #[test]
    fn test_payload_flattens_snapshot() {
        let snapshot = Snapshot {
            temp: Some(24.5),
            ..Default::default()
        };
        let json = serde_json::to_value(Payload {
            snapshot: &snapshot,
            timestamp: 1_700_000_000,
        })
        .unwrap();

        assert_eq!(json["timestamp"], 1_700_000_000);
        assert_eq!(json["temp"], 24.5);
        assert!(json["modem"].is_object());
        assert!(json.get("snapshot").is_none());
    }
}
