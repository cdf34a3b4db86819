//! Transactional application of retroactive changes.
//!
//! Commits run under the session's write guard: structural validation, a
//! simulated re-detection on a cloned canon, then an atomic swap. All
//! changes of one resolution land together or not at all, and a rejected
//! batch leaves canon untouched. A commit in progress can be cancelled
//! (by dropping the future) at any point before the swap; after the swap
//! it is durable and reversible only through an explicit inverse change.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use reverie_canon::audit::snapshot_digest;
use reverie_canon::{
    AppliedChange, AuditLog, AuditRecord, NarrativeContent, RetroactiveChange, SessionCanon,
};
use reverie_core::clock::Clock;

use crate::config::DetectionConfig;
use crate::detection::ContradictionDetector;
use crate::domain::contradiction::{Contradiction, ContradictionIdentity};

/// Outcome of one commit attempt.
///
/// Commit failures are values, never propagated errors: the upstream
/// generator must always receive an answer.
#[derive(Debug, Clone)]
pub struct CommitResult {
    /// Whether the batch was applied.
    pub applied: bool,
    /// Why the batch was rejected, when it was.
    pub rejected_reason: Option<String>,
    /// Ids of the applied changes, in order.
    pub applied_change_ids: Vec<Uuid>,
}

impl CommitResult {
    fn applied(change_ids: Vec<Uuid>) -> Self {
        Self {
            applied: true,
            rejected_reason: None,
            applied_change_ids: change_ids,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            applied: false,
            rejected_reason: Some(reason.into()),
            applied_change_ids: Vec::new(),
        }
    }
}

/// Validates and transactionally applies retroactive change batches.
pub struct RetroactiveChangeManager {
    detector: ContradictionDetector,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
}

impl RetroactiveChangeManager {
    /// Creates a manager that re-detects with the given thresholds.
    #[must_use]
    pub fn new(
        detection: DetectionConfig,
        audit: Arc<AuditLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            detector: ContradictionDetector::new(detection),
            audit,
            clock,
        }
    }

    /// The audit log this manager appends to.
    #[must_use]
    pub fn audit(&self) -> Arc<AuditLog> {
        Arc::clone(&self.audit)
    }

    /// Commits a change batch for one resolution.
    ///
    /// Pipeline, in order: structural check (fail fast), simulated
    /// re-detection against a post-change clone rejecting any *new*
    /// contradiction at or above the resolved severity, then the atomic
    /// swap plus audit append. The session write guard is held throughout,
    /// so commits for one session never interleave.
    pub async fn commit(
        &self,
        session: &Arc<tokio::sync::RwLock<SessionCanon>>,
        resolution_id: Uuid,
        resolved: &Contradiction,
        content: &NarrativeContent,
        changes: &[RetroactiveChange],
    ) -> CommitResult {
        // 1. Structural check, before touching canon.
        for change in changes {
            if let Err(err) = change.validate_structure() {
                warn!(change_id = %change.id, error = %err, "rejecting batch on structural check");
                return CommitResult::rejected(err.to_string());
            }
        }
        if changes.is_empty() {
            // A purely interpretive solution needs no canon change.
            return CommitResult::applied(Vec::new());
        }

        let mut guard = session.write().await;
        let session_id = guard.session_id();

        // 2. Simulate the batch on a clone and re-detect.
        let baseline = self.detector.detect(content, &guard);
        let mut remaining = multiset(baseline.contradictions.iter().map(Contradiction::identity));

        let applied_at = self.clock.now();
        let mut simulated = guard.clone();
        let mut applied: Vec<(RetroactiveChange, AppliedChange)> = Vec::new();
        for change in changes {
            match simulated.apply_change(change, applied_at) {
                Ok(outcome) => applied.push((change.clone(), outcome)),
                Err(err) => {
                    warn!(change_id = %change.id, error = %err, "rejecting batch; canon unchanged");
                    return CommitResult::rejected(err.to_string());
                }
            }
        }

        let post = self.detector.detect(content, &simulated);
        for contradiction in &post.contradictions {
            let identity = contradiction.identity();
            if let Some(count) = remaining.get_mut(&identity) {
                if *count > 0 {
                    *count -= 1;
                    continue;
                }
            }
            if contradiction.severity >= resolved.severity {
                warn!(
                    severity = ?contradiction.severity,
                    "rejecting batch: simulated canon introduces a contradiction at or above the resolved severity"
                );
                return CommitResult::rejected(format!(
                    "applying the batch would introduce a new {} contradiction at severity {:?}: {}",
                    contradiction.kind.as_str(),
                    contradiction.severity,
                    contradiction.description
                ));
            }
        }

        // 3. Atomic swap, then audit.
        *guard = simulated;
        drop(guard);

        let mut change_ids = Vec::with_capacity(applied.len());
        for (change, outcome) in applied {
            change_ids.push(change.id);
            self.audit.append(AuditRecord {
                change_id: change.id,
                resolution_id,
                session_id,
                original_digest: snapshot_digest(&change.original_content),
                modified_digest: snapshot_digest(&change.modified_content),
                created_id: outcome.created_id,
                applied_at,
                change,
            });
        }
        info!(%resolution_id, count = change_ids.len(), "committed retroactive change batch");
        CommitResult::applied(change_ids)
    }
}

fn multiset(
    identities: impl Iterator<Item = ContradictionIdentity>,
) -> HashMap<ContradictionIdentity, usize> {
    let mut counts = HashMap::new();
    for identity in identities {
        *counts.entry(identity).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    use reverie_canon::{Assertion, ChangeKind, SubjectKey};
    use reverie_core::score::UnitScore;
    use reverie_test_support::{FixedClock, content_at, soft_lore};

    use crate::domain::contradiction::{
        ConflictingElement, ContradictionKind, Severity,
    };

    fn manager() -> RetroactiveChangeManager {
        RetroactiveChangeManager::new(
            DetectionConfig::default(),
            Arc::new(AuditLog::new()),
            Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            )),
        )
    }

    struct Fixture {
        session: Arc<tokio::sync::RwLock<SessionCanon>>,
        content: NarrativeContent,
        resolved: Contradiction,
        lore_id: Uuid,
    }

    /// Canon where John fears heights, content that climbs fearlessly, and
    /// the direct contradiction between them.
    fn john_fixture() -> Fixture {
        let session_id = Uuid::new_v4();
        let mut canon = SessionCanon::new(session_id);
        let lore_id = canon
            .establish_lore(soft_lore("john", "fear of heights", "John fears heights"))
            .unwrap();

        let mut content = content_at(session_id, "John climbs the tower fearlessly", 2);
        content.assertions.push(Assertion::new(
            SubjectKey::new("john", "fear of heights"),
            "climbs the tower fearlessly",
            UnitScore::new(0.9),
        ));

        let resolved = Contradiction::new(
            ContradictionKind::Direct,
            Severity::Error,
            "asserted fearlessness contradicts established fear",
            vec![
                ConflictingElement {
                    id: lore_id,
                    summary: "John fears heights".to_owned(),
                },
                ConflictingElement {
                    id: content.id,
                    summary: "climbs the tower fearlessly".to_owned(),
                },
            ],
            UnitScore::new(0.9),
        );

        Fixture {
            session: Arc::new(tokio::sync::RwLock::new(canon)),
            content,
            resolved,
            lore_id,
        }
    }

    fn annotation(target: Uuid) -> RetroactiveChange {
        RetroactiveChange::new(
            target,
            ChangeKind::Annotation,
            "John fears heights",
            "His fear holds, but tonight something matters more than the drop.",
            "preserves the trait while licensing the fearless act",
            "Hands shaking on the cold stone, John climbs anyway.",
        )
    }

    #[tokio::test]
    async fn test_batch_with_empty_justification_is_rejected_fast() {
        let fixture = john_fixture();
        let manager = manager();
        let mut change = annotation(fixture.lore_id);
        change.justification = String::new();

        let result = manager
            .commit(
                &fixture.session,
                Uuid::new_v4(),
                &fixture.resolved,
                &fixture.content,
                &[change],
            )
            .await;

        assert!(!result.applied);
        assert!(result.rejected_reason.unwrap().contains("justification"));
        assert_eq!(fixture.session.read().await.revision(), 0);
        assert!(manager.audit().is_empty());
    }

    #[tokio::test]
    async fn test_annotation_batch_commits_and_audits() {
        let fixture = john_fixture();
        let manager = manager();
        let change = annotation(fixture.lore_id);
        let change_id = change.id;

        let result = manager
            .commit(
                &fixture.session,
                Uuid::new_v4(),
                &fixture.resolved,
                &fixture.content,
                &[change],
            )
            .await;

        assert!(result.applied);
        assert_eq!(result.applied_change_ids, vec![change_id]);

        let canon = fixture.session.read().await;
        assert_eq!(canon.annotations_for(fixture.lore_id).len(), 1);
        assert_eq!(canon.lore(fixture.lore_id).unwrap().fact, "John fears heights");
        assert!(manager.audit().record_for(change_id).is_some());
    }

    #[tokio::test]
    async fn test_modification_introducing_equal_severity_contradiction_is_rejected() {
        let fixture = john_fixture();
        let manager = manager();
        // The rewritten fact still conflicts with the asserted fearlessness,
        // so the simulated canon re-detects at the same severity against a
        // new lore head.
        let change = RetroactiveChange::new(
            fixture.lore_id,
            ChangeKind::Modification,
            "John fears heights",
            "John delights in the open sky",
            "attempts a rewrite that does not fit the scene",
            "He always loved the sky, people just misread him.",
        );

        let result = manager
            .commit(
                &fixture.session,
                Uuid::new_v4(),
                &fixture.resolved,
                &fixture.content,
                &[change],
            )
            .await;

        assert!(!result.applied);
        assert!(result.rejected_reason.unwrap().contains("new direct contradiction"));

        // Canon is untouched.
        let canon = fixture.session.read().await;
        assert_eq!(canon.revision(), 0);
        assert_eq!(canon.lore(fixture.lore_id).unwrap().fact, "John fears heights");
        assert!(canon.lore(fixture.lore_id).unwrap().is_head());
        assert!(manager.audit().is_empty());
    }

    #[tokio::test]
    async fn test_compatible_modification_commits() {
        let fixture = john_fixture();
        let manager = manager();
        let change = RetroactiveChange::new(
            fixture.lore_id,
            ChangeKind::Modification,
            "John fears heights",
            "John now climbs the tower fearlessly, his old fear mastered",
            "brings the fact in line with the accepted scene",
            "Years of quiet practice paid off the night it counted.",
        );

        let result = manager
            .commit(
                &fixture.session,
                Uuid::new_v4(),
                &fixture.resolved,
                &fixture.content,
                &[change],
            )
            .await;

        assert!(result.applied);
        let canon = fixture.session.read().await;
        let old = canon.lore(fixture.lore_id).unwrap();
        assert!(old.superseded_by.is_some());
        let heads = canon.lore_heads_for(&SubjectKey::new("john", "fear of heights"));
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].version, 2);
    }

    #[tokio::test]
    async fn test_batch_is_atomic_when_one_change_fails() {
        let fixture = john_fixture();
        let manager = manager();
        let good = annotation(fixture.lore_id);
        let bad = RetroactiveChange::new(
            Uuid::new_v4(), // unknown target
            ChangeKind::Annotation,
            "",
            "a note into the void",
            "testing atomicity",
            "Nothing answers.",
        );

        let result = manager
            .commit(
                &fixture.session,
                Uuid::new_v4(),
                &fixture.resolved,
                &fixture.content,
                &[good, bad],
            )
            .await;

        assert!(!result.applied);
        // The valid annotation did not land either.
        let canon = fixture.session.read().await;
        assert!(canon.annotations_for(fixture.lore_id).is_empty());
        assert_eq!(canon.revision(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_commits_vacuously() {
        let fixture = john_fixture();
        let manager = manager();

        let result = manager
            .commit(
                &fixture.session,
                Uuid::new_v4(),
                &fixture.resolved,
                &fixture.content,
                &[],
            )
            .await;

        assert!(result.applied);
        assert!(result.applied_change_ids.is_empty());
        assert_eq!(fixture.session.read().await.revision(), 0);
    }

    #[tokio::test]
    async fn test_inverse_change_restores_original_exactly() {
        let session_id = Uuid::new_v4();
        let mut canon = SessionCanon::new(session_id);
        let lore_id = canon
            .establish_lore(soft_lore("marta", "allegiance", "Marta serves the crown"))
            .unwrap();
        let session = Arc::new(tokio::sync::RwLock::new(canon));
        // Neutral content: no claims, so detection is silent throughout.
        let content = content_at(session_id, "The court convenes at dawn", 2);
        let resolved = Contradiction::new(
            ContradictionKind::Direct,
            Severity::Error,
            "placeholder",
            vec![],
            UnitScore::new(0.5),
        );
        let manager = manager();

        let change = RetroactiveChange::new(
            lore_id,
            ChangeKind::Modification,
            "Marta serves the crown",
            "Marta serves the crown in public and the resistance in secret",
            "sets up the betrayal arc",
            "Every court has its double agents.",
        );
        let change_id = change.id;
        let first = manager
            .commit(&session, Uuid::new_v4(), &resolved, &content, &[change])
            .await;
        assert!(first.applied);

        let inverse = manager.audit().inverse_of(change_id).unwrap();
        let second = manager
            .commit(&session, Uuid::new_v4(), &resolved, &content, &[inverse])
            .await;
        assert!(second.applied);

        let canon = session.read().await;
        let heads = canon.lore_heads_for(&SubjectKey::new("marta", "allegiance"));
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].fact, "Marta serves the crown");
        assert_eq!(heads[0].version, 3);
    }
}
