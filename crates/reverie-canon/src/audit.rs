//! Audit log for applied retroactive changes.
//!
//! Every applied change is appended here, keyed by change id, with digests
//! of the original and modified snapshots. The log supports reconstructing
//! an inverse change for manual reversal; reversal is itself a new
//! retroactive change, not an in-place undo.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::retcon::RetroactiveChange;

/// Hex-encoded SHA-256 of a text snapshot.
#[must_use]
pub fn snapshot_digest(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// One applied change, as recorded in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The applied change's id.
    pub change_id: Uuid,
    /// The resolution the change belonged to.
    pub resolution_id: Uuid,
    /// The session whose canon was changed.
    pub session_id: Uuid,
    /// The change as applied.
    pub change: RetroactiveChange,
    /// Digest of the original snapshot.
    pub original_digest: String,
    /// Digest of the modified text.
    pub modified_digest: String,
    /// Id of the entity the change created, if any.
    pub created_id: Option<Uuid>,
    /// When the change was applied.
    pub applied_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Reconstructs the inverse of this change: original and modified
    /// content swapped, targeting the successor entity when one was created.
    ///
    /// The inverse is a new change with its own id and must go through the
    /// change manager's full commit pipeline like any other.
    #[must_use]
    pub fn inverse(&self) -> RetroactiveChange {
        RetroactiveChange::new(
            self.created_id.unwrap_or(self.change.target_id),
            self.change.kind,
            self.change.modified_content.clone(),
            self.change.original_content.clone(),
            format!("reversal of retroactive change {}", self.change_id),
            "The earlier account was true after all; what seemed rewritten is remembered rightly again.",
        )
    }
}

/// Append-only, thread-safe audit log.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl AuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    ///
    /// # Panics
    ///
    /// Panics if the log's lock is poisoned.
    pub fn append(&self, record: AuditRecord) {
        self.records.lock().expect("audit log poisoned").push(record);
    }

    /// Looks up a record by the id of the change it describes.
    ///
    /// # Panics
    ///
    /// Panics if the log's lock is poisoned.
    #[must_use]
    pub fn record_for(&self, change_id: Uuid) -> Option<AuditRecord> {
        self.records
            .lock()
            .expect("audit log poisoned")
            .iter()
            .find(|record| record.change_id == change_id)
            .cloned()
    }

    /// All records for a session, in applied order.
    ///
    /// # Panics
    ///
    /// Panics if the log's lock is poisoned.
    #[must_use]
    pub fn records_for_session(&self, session_id: Uuid) -> Vec<AuditRecord> {
        self.records
            .lock()
            .expect("audit log poisoned")
            .iter()
            .filter(|record| record.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Reconstructs the inverse of an applied change, if it is on record.
    ///
    /// # Panics
    ///
    /// Panics if the log's lock is poisoned.
    #[must_use]
    pub fn inverse_of(&self, change_id: Uuid) -> Option<RetroactiveChange> {
        self.record_for(change_id).map(|record| record.inverse())
    }

    /// Number of records.
    ///
    /// # Panics
    ///
    /// Panics if the log's lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("audit log poisoned").len()
    }

    /// True when no changes have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retcon::ChangeKind;

    fn record() -> AuditRecord {
        let change = RetroactiveChange::new(
            Uuid::new_v4(),
            ChangeKind::Modification,
            "John fears heights",
            "John overcame his fear of heights",
            "reconciles the tower scene",
            "Years of quiet practice paid off at last.",
        );
        AuditRecord {
            change_id: change.id,
            resolution_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            original_digest: snapshot_digest(&change.original_content),
            modified_digest: snapshot_digest(&change.modified_content),
            created_id: Some(Uuid::new_v4()),
            applied_at: Utc::now(),
            change,
        }
    }

    #[test]
    fn test_snapshot_digest_is_stable_hex() {
        let a = snapshot_digest("John fears heights");
        let b = snapshot_digest("John fears heights");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_inverse_swaps_snapshots_and_targets_successor() {
        let record = record();
        let inverse = record.inverse();

        assert_eq!(inverse.target_id, record.created_id.unwrap());
        assert_eq!(inverse.original_content, record.change.modified_content);
        assert_eq!(inverse.modified_content, record.change.original_content);
        assert_ne!(inverse.id, record.change_id);
        assert!(inverse.validate_structure().is_ok());
    }

    #[test]
    fn test_inverse_of_unknown_change_is_none() {
        let log = AuditLog::new();
        assert!(log.inverse_of(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_append_and_lookup_by_change_id() {
        let log = AuditLog::new();
        let record = record();
        let change_id = record.change_id;

        log.append(record);

        assert_eq!(log.len(), 1);
        assert!(log.record_for(change_id).is_some());
    }
}
