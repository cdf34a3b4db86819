//! Established lore entries — the facts the world is built on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of fact a lore entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoreCategory {
    /// A fact about a character.
    Character,
    /// A fact about a place.
    Location,
    /// A rule of the world.
    Rule,
    /// An event that happened.
    Event,
}

/// How firmly a fact is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Immutability {
    /// Load-bearing canon; retroactive modification is refused.
    HardCanon,
    /// Established but revisable through a justified retroactive change.
    Soft,
}

/// Subject + attribute lookup key for fast contradiction checks.
///
/// Normalized to lowercase on construction so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectKey {
    /// Who or what the fact is about.
    pub subject: String,
    /// Which attribute of the subject it concerns.
    pub attribute: String,
}

impl SubjectKey {
    /// Creates a normalized key.
    #[must_use]
    pub fn new(subject: &str, attribute: &str) -> Self {
        Self {
            subject: subject.trim().to_lowercase(),
            attribute: attribute.trim().to_lowercase(),
        }
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subject, self.attribute)
    }
}

/// One version of an established fact.
///
/// Entries are never hard-deleted. Superseding a fact creates a new entry
/// with a fresh id and `version + 1`; the old entry keeps a
/// `superseded_by` back-reference to its successor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreEntry {
    /// Unique id of this version.
    pub id: Uuid,
    /// Kind of fact.
    pub category: LoreCategory,
    /// The canonical fact text.
    pub fact: String,
    /// Subject + attribute key for contradiction lookup.
    pub key: SubjectKey,
    /// Narrative position at which the fact was established.
    pub established_at: u64,
    /// How firmly the fact is established.
    pub immutability: Immutability,
    /// Version number within the fact's supersede chain.
    pub version: u32,
    /// Id of the entry that superseded this one, if any.
    pub superseded_by: Option<Uuid>,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
}

impl LoreEntry {
    /// Creates a first-version lore entry.
    #[must_use]
    pub fn new(
        category: LoreCategory,
        fact: impl Into<String>,
        key: SubjectKey,
        established_at: u64,
        immutability: Immutability,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            fact: fact.into(),
            key,
            established_at,
            immutability,
            version: 1,
            superseded_by: None,
            created_at,
        }
    }

    /// True if no successor has superseded this entry.
    #[must_use]
    pub fn is_head(&self) -> bool {
        self.superseded_by.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_key_normalizes_case_and_whitespace() {
        let key = SubjectKey::new("  John ", "Fear of Heights");
        assert_eq!(key.subject, "john");
        assert_eq!(key.attribute, "fear of heights");
    }

    #[test]
    fn test_normalized_keys_are_equal() {
        assert_eq!(
            SubjectKey::new("John", "courage"),
            SubjectKey::new("john", "COURAGE")
        );
    }

    #[test]
    fn test_new_entry_is_head_at_version_one() {
        let entry = LoreEntry::new(
            LoreCategory::Character,
            "John fears heights",
            SubjectKey::new("john", "fear of heights"),
            1,
            Immutability::Soft,
            Utc::now(),
        );
        assert!(entry.is_head());
        assert_eq!(entry.version, 1);
    }
}
