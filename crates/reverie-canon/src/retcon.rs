//! Retroactive changes — justified, explained revisions of canon.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reverie_core::error::CoherenceError;

/// How a retroactive change touches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Supersede the target with revised text.
    Modification,
    /// Add a new, causally linked record alongside the target.
    Addition,
    /// Attach a reinterpreting note; the target text is untouched.
    Annotation,
}

/// A single justified revision of previously established canon.
///
/// Invariant: `justification` and `in_world_explanation` are non-empty
/// before a batch commits; the change manager fails fast otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetroactiveChange {
    /// Change identifier.
    pub id: Uuid,
    /// The lore entry or content record being revised.
    pub target_id: Uuid,
    /// How the target is touched.
    pub kind: ChangeKind,
    /// Snapshot of the target's text at the time the change was drafted.
    pub original_content: String,
    /// The revised or added text.
    pub modified_content: String,
    /// Out-of-fiction reason the revision is needed.
    pub justification: String,
    /// Player-facing diegetic explanation of the revision.
    pub in_world_explanation: String,
}

impl RetroactiveChange {
    /// Creates a change.
    #[must_use]
    pub fn new(
        target_id: Uuid,
        kind: ChangeKind,
        original_content: impl Into<String>,
        modified_content: impl Into<String>,
        justification: impl Into<String>,
        in_world_explanation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_id,
            kind,
            original_content: original_content.into(),
            modified_content: modified_content.into(),
            justification: justification.into(),
            in_world_explanation: in_world_explanation.into(),
        }
    }

    /// Checks the structural invariant: justification and in-world
    /// explanation must both be non-empty.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::InputValidation` naming the offending field.
    pub fn validate_structure(&self) -> Result<(), CoherenceError> {
        if self.justification.trim().is_empty() {
            return Err(CoherenceError::InputValidation(format!(
                "retroactive change {} has an empty justification",
                self.id
            )));
        }
        if self.in_world_explanation.trim().is_empty() {
            return Err(CoherenceError::InputValidation(format!(
                "retroactive change {} has an empty in-world explanation",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(justification: &str, explanation: &str) -> RetroactiveChange {
        RetroactiveChange::new(
            Uuid::new_v4(),
            ChangeKind::Modification,
            "old",
            "new",
            justification,
            explanation,
        )
    }

    #[test]
    fn test_validate_structure_accepts_populated_change() {
        assert!(
            change("resolves a direct conflict", "a long-kept secret surfaces")
                .validate_structure()
                .is_ok()
        );
    }

    #[test]
    fn test_validate_structure_rejects_empty_justification() {
        let result = change("   ", "a long-kept secret surfaces").validate_structure();
        match result.unwrap_err() {
            reverie_core::error::CoherenceError::InputValidation(msg) => {
                assert!(msg.contains("justification"));
            }
            other => panic!("expected InputValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_structure_rejects_empty_explanation() {
        let result = change("resolves a direct conflict", "").validate_structure();
        match result.unwrap_err() {
            reverie_core::error::CoherenceError::InputValidation(msg) => {
                assert!(msg.contains("in-world explanation"));
            }
            other => panic!("expected InputValidation, got {other:?}"),
        }
    }
}
