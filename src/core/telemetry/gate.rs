//! Change detection between publication cycles.

use sha2::{Digest, Sha256};

use super::metrics::Snapshot;
use crate::error::Result;

/// Content hash of a snapshot's fields. The publication timestamp is
/// not part of [`Snapshot`], so field-identical snapshots from
/// different ticks hash identically.
pub type Fingerprint = [u8; 32];

/// Suppresses redundant publications.
///
/// The gate keeps the fingerprint of the most recently accepted
/// snapshot (empty at startup, so the first snapshot always passes)
/// plus the snapshot itself for diagnostics. It is owned by the cycle
/// task; the strictly sequential cycle is the single writer.
#[derive(Debug, Default)]
pub struct ChangeGate {
    last_fingerprint: Option<Fingerprint>,
    last_snapshot: Option<Snapshot>,
}

impl ChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether `snapshot` should be published.
    ///
    /// On accept the gate records the new fingerprint before
    /// returning, so the hand-off that follows can be detached without
    /// a second look at the gate.
    pub fn accept(&mut self, snapshot: &Snapshot) -> Result<bool> {
        let fingerprint = fingerprint(snapshot)?;
        if self.last_fingerprint == Some(fingerprint) {
            return Ok(false);
        }
        self.last_fingerprint = Some(fingerprint);
        self.last_snapshot = Some(snapshot.clone());
        Ok(true)
    }

    /// Most recently accepted snapshot.
    pub fn last_published(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }
}

/// SHA-256 over the snapshot's canonical JSON form. Struct fields
/// serialize in declaration order, which keeps the byte form stable
/// across ticks.
pub fn fingerprint(snapshot: &Snapshot) -> Result<Fingerprint> {
    let canonical = serde_json::to_vec(snapshot)?;
    Ok(Sha256::digest(&canonical).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telemetry::metrics::{ModemStatus, SystemStatus};

    fn sample_snapshot(signal: i64) -> Snapshot {
        Snapshot {
            modem: ModemStatus {
                tech: Some(serde_json::json!("lte")),
                signal: Some(signal),
            },
            system: SystemStatus {
                watts: Some(7.25),
                load: Some(12.5),
                ..Default::default()
            },
            temp: Some(24.3),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_snapshot_always_accepted() {
        let mut gate = ChangeGate::new();
        assert!(gate.accept(&sample_snapshot(70)).unwrap());
        assert_eq!(gate.last_published(), Some(&sample_snapshot(70)));
    }

    #[test]
    fn test_identical_snapshot_suppressed() {
        let mut gate = ChangeGate::new();
        assert!(gate.accept(&sample_snapshot(70)).unwrap());
        assert!(!gate.accept(&sample_snapshot(70)).unwrap());
    }

    #[test]
    fn test_single_field_change_accepted() {
        let mut gate = ChangeGate::new();
        assert!(gate.accept(&sample_snapshot(70)).unwrap());
        assert!(!gate.accept(&sample_snapshot(70)).unwrap());
        assert!(gate.accept(&sample_snapshot(65)).unwrap());
        assert_eq!(gate.last_published(), Some(&sample_snapshot(65)));
    }

    #[test]
    fn test_all_absent_snapshot_is_publishable() {
        let mut gate = ChangeGate::new();
        assert!(gate.accept(&Snapshot::default()).unwrap());
        assert!(!gate.accept(&Snapshot::default()).unwrap());
    }

    #[test]
    fn test_field_identical_snapshots_share_fingerprint() {
        assert_eq!(
            fingerprint(&sample_snapshot(70)).unwrap(),
            fingerprint(&sample_snapshot(70)).unwrap()
        );
        assert_ne!(
            fingerprint(&sample_snapshot(70)).unwrap(),
            fingerprint(&sample_snapshot(65)).unwrap()
        );
    }
}
