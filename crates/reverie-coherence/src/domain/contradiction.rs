//! Detected contradictions and consistency issues.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reverie_core::score::UnitScore;

/// How serious a detected inconsistency is.
///
/// Variants are ordered: `Info < Warning < Error < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth a look, nothing broken.
    Info,
    /// Heuristic or soft inconsistency.
    Warning,
    /// Factual inconsistency with established canon.
    Error,
    /// Violates hard canon; blocks surfacing until resolved.
    Critical,
}

impl Severity {
    /// Numeric rank, `0` (info) through `3` (critical).
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Warning => 1,
            Self::Error => 2,
            Self::Critical => 3,
        }
    }
}

/// Which detection strategy found the inconsistency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    /// An asserted value is mutually exclusive with a canon fact sharing
    /// the same subject+attribute key.
    Direct,
    /// An implied event ordering conflicts with recorded positions.
    Temporal,
    /// A causal link is missing or points forward in time.
    Causal,
    /// Theme/tone drift from the active storylines.
    Implicit,
}

impl ContradictionKind {
    /// Snake-case tag for logs and scoring requests.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Temporal => "temporal",
            Self::Causal => "causal",
            Self::Implicit => "implicit",
        }
    }
}

/// One of the elements a contradiction is between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictingElement {
    /// Id of the lore entry, content record, or thread involved.
    pub id: Uuid,
    /// Short human-readable summary of the element's claim.
    pub summary: String,
}

/// A detected inconsistency between new content and canon or storylines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contradiction {
    /// Identifier of this detection result (fresh per pass).
    pub id: Uuid,
    /// Which strategy found it.
    pub kind: ContradictionKind,
    /// How serious it is.
    pub severity: Severity,
    /// What is inconsistent, in prose.
    pub description: String,
    /// The elements in conflict.
    pub elements: Vec<ConflictingElement>,
    /// How confident the detector is.
    pub confidence: UnitScore,
}

/// Identity of a contradiction for multiset comparison across passes.
///
/// Ids are fresh per pass; what must be stable is the combination of kind,
/// conflicting element ids, and severity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContradictionIdentity {
    /// Which strategy found it.
    pub kind: ContradictionKind,
    /// How serious it is.
    pub severity: Severity,
    /// Sorted ids of the conflicting elements.
    pub elements: Vec<Uuid>,
}

impl Contradiction {
    /// Creates a contradiction with a fresh id.
    #[must_use]
    pub fn new(
        kind: ContradictionKind,
        severity: Severity,
        description: impl Into<String>,
        elements: Vec<ConflictingElement>,
        confidence: UnitScore,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity,
            description: description.into(),
            elements,
            confidence,
        }
    }

    /// Pass-stable identity for multiset comparison.
    #[must_use]
    pub fn identity(&self) -> ContradictionIdentity {
        let mut elements: Vec<Uuid> = self.elements.iter().map(|e| e.id).collect();
        elements.sort_unstable();
        ContradictionIdentity {
            kind: self.kind,
            severity: self.severity,
            elements,
        }
    }
}

/// A generic consistency issue that is not itself a contradiction —
/// notably a detection strategy degrading after an internal failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    /// How serious the issue is.
    pub severity: Severity,
    /// Where it came from (strategy name or pipeline stage).
    pub source: String,
    /// What happened.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_identity_ignores_id_and_element_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let first = Contradiction::new(
            ContradictionKind::Direct,
            Severity::Error,
            "first pass",
            vec![
                ConflictingElement { id: a, summary: "x".into() },
                ConflictingElement { id: b, summary: "y".into() },
            ],
            UnitScore::new(0.8),
        );
        let second = Contradiction::new(
            ContradictionKind::Direct,
            Severity::Error,
            "second pass",
            vec![
                ConflictingElement { id: b, summary: "y".into() },
                ConflictingElement { id: a, summary: "x".into() },
            ],
            UnitScore::new(0.6),
        );

        assert_eq!(first.identity(), second.identity());
        assert_ne!(first.id, second.id);
    }
}
