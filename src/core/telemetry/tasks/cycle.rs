//! Publication cycle task.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::core::telemetry::gate::ChangeGate;
use crate::core::telemetry::metrics::{Payload, Snapshot};
use crate::core::telemetry::readers::{system, ModemReader, SharedGauge};
use crate::core::telemetry::smoother::SharedWindow;
use crate::livekit::RoomServiceClient;

/// Task that drives one publication cycle per second.
///
/// Each tick fans the blocking source reads out, joins them, assembles
/// the snapshot, and asks the gate whether the content changed. Only
/// the registry call itself is detached from the tick; the cycle does
/// not advance until the gate decision lands.
pub async fn cycle_task(
    client: Arc<RoomServiceClient>,
    room: String,
    gauge: SharedGauge,
    window: SharedWindow,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut gate = ChangeGate::new();
    let modem = Arc::new(Mutex::new(ModemReader::new()));

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = build_snapshot(&modem, &gauge, &window).await;
                match gate.accept(&snapshot) {
                    Ok(true) => publish(&client, &room, &snapshot),
                    Ok(false) => {}
                    Err(e) => log::error!("Failed to fingerprint snapshot: {}", e),
                }
            }
            _ = shutdown.recv() => {
                break;
            }
        }
    }
}

/// Invokes every reader concurrently (they touch disjoint hardware)
/// and merges their output with the smoother's current average. A
/// reader whose task died reports absent fields for this cycle.
async fn build_snapshot(
    modem: &Arc<Mutex<ModemReader>>,
    gauge: &SharedGauge,
    window: &SharedWindow,
) -> Snapshot {
    let modem_handle = {
        let modem = Arc::clone(modem);
        task::spawn_blocking(move || modem.lock().read())
    };
    let ups_handle = {
        let gauge = Arc::clone(gauge);
        task::spawn_blocking(move || gauge.lock().read())
    };
    let system_handle = task::spawn_blocking(system::read_system_status);

    let (modem_result, ups_result, system_result) =
        tokio::join!(modem_handle, ups_handle, system_handle);

    let (modem_status, location) = recover(modem_result, "modem");
    let ups = recover(ups_result, "ups");
    let system = recover(system_result, "system");

    Snapshot {
        modem: modem_status,
        location,
        system,
        ups,
        temp: window.lock().average(),
    }
}

fn recover<T: Default>(result: Result<T, task::JoinError>, reader: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!("{} reader task failed: {}", reader, e);
            T::default()
        }
    }
}

/// Fire-and-forget hand-off to the registry. The gate already recorded
/// the fingerprint, so a failed publish is only logged; the content is
/// carried again on the next change, not the next tick.
fn publish(client: &Arc<RoomServiceClient>, room: &str, snapshot: &Snapshot) {
    let timestamp = chrono::Utc::now().timestamp();
    let payload = match serde_json::to_string(&Payload {
        snapshot,
        timestamp,
    }) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize payload: {}", e);
            return;
        }
    };

    log::debug!("Updating room metadata: {}", payload);

    let client = Arc::clone(client);
    let room = room.to_string();
    tokio::spawn(async move {
        if let Err(e) = client.update_room_metadata(&room, &payload).await {
            log::error!("Failed to update room metadata: {}", e);
        }
    });
}
