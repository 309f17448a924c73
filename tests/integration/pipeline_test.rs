//! End-to-end properties of the snapshot/gate pipeline, driven with
//! hand-built reader outputs instead of live hardware.

use fieldcast::core::telemetry::{
    fingerprint, ChangeGate, LocationFix, ModemStatus, Payload, Snapshot, SystemStatus,
    TemperatureWindow, UpsStatus,
};

fn cycle_snapshot(signal: i64, window: &TemperatureWindow) -> Snapshot {
    Snapshot {
        modem: ModemStatus {
            tech: Some(serde_json::json!(["lte"])),
            signal: Some(signal),
        },
        location: LocationFix {
            long: Some(-6.505),
            lat: Some(53.361),
            alt: Some(61.7),
            speed: Some(10.2),
            sat: Some(8.0),
            hdop: Some(1.03),
        },
        system: SystemStatus {
            watts: Some(7.43),
            temperature: Some(48.9),
            fan: Some(1713.0),
            load: Some(12.34),
        },
        ups: UpsStatus {
            voltage: Some(4.05),
            capacity: Some(86.21),
        },
        temp: window.average(),
    }
}

#[test]
fn test_first_identical_changed_cycle_sequence() {
    let mut window = TemperatureWindow::new();
    for sample in [24.1, 24.2, 24.3] {
        window.push(sample);
    }

    let mut gate = ChangeGate::new();

    // First cycle with readable fields always publishes.
    assert!(gate.accept(&cycle_snapshot(70, &window)).unwrap());

    // Identical second cycle (same field values, later tick) must not.
    assert!(!gate.accept(&cycle_snapshot(70, &window)).unwrap());

    // A single changed field re-opens the gate.
    assert!(gate.accept(&cycle_snapshot(65, &window)).unwrap());
}

#[test]
fn test_all_absent_cycle_is_well_formed_and_publishes() {
    // Every reader failing yields a default snapshot; the empty window
    // contributes an absent average rather than a division error.
    let window = TemperatureWindow::new();
    let snapshot = Snapshot {
        temp: window.average(),
        ..Default::default()
    };

    let mut gate = ChangeGate::new();
    assert!(gate.accept(&snapshot).unwrap());

    let json = serde_json::to_value(&snapshot).unwrap();
    for pointer in [
        "/modem/tech",
        "/modem/signal",
        "/location/long",
        "/location/speed",
        "/system/watts",
        "/system/load",
        "/ups/voltage",
        "/ups/capacity",
        "/temp",
    ] {
        assert!(
            json.pointer(pointer).unwrap().is_null(),
            "{} should be null",
            pointer
        );
    }
}

#[test]
fn test_fingerprint_is_timestamp_invariant() {
    let window = TemperatureWindow::new();
    let snapshot = cycle_snapshot(70, &window);

    // The wire payload differs tick to tick...
    let early = serde_json::to_string(&Payload {
        snapshot: &snapshot,
        timestamp: 1_700_000_000,
    })
    .unwrap();
    let late = serde_json::to_string(&Payload {
        snapshot: &snapshot,
        timestamp: 1_700_000_060,
    })
    .unwrap();
    assert_ne!(early, late);

    // ...but the fingerprint never sees the timestamp.
    assert_eq!(
        fingerprint(&snapshot).unwrap(),
        fingerprint(&snapshot).unwrap()
    );
}

#[test]
fn test_published_payload_carries_every_field_and_timestamp() {
    let mut window = TemperatureWindow::new();
    window.push(24.15);

    let snapshot = cycle_snapshot(70, &window);
    let json = serde_json::to_value(Payload {
        snapshot: &snapshot,
        timestamp: 1_700_000_000,
    })
    .unwrap();

    assert_eq!(json["timestamp"], 1_700_000_000);
    assert_eq!(json["modem"]["signal"], 70);
    assert_eq!(json["location"]["sat"], 8.0);
    assert_eq!(json["system"]["fan"], 1713.0);
    // f32 fields round-trip through JSON as their exact f64 image.
    assert_eq!(json["ups"]["capacity"].as_f64().unwrap() as f32, 86.21);
    // Smoothed average is truncated to one decimal before it lands.
    assert_eq!(json["temp"].as_f64().unwrap() as f32, 24.1);
}
