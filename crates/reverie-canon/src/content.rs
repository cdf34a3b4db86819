//! Narrative content — one accepted item per narrative turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reverie_core::score::UnitScore;

use crate::lore::SubjectKey;

/// A claim the content makes about a subject's attribute.
///
/// Assertions are the structured form the direct-contradiction strategy
/// compares against lore sharing the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    /// Subject + attribute the claim is about.
    pub key: SubjectKey,
    /// The asserted value or statement.
    pub statement: String,
    /// How strongly the text commits to the claim.
    pub strength: UnitScore,
}

impl Assertion {
    /// Creates an assertion.
    #[must_use]
    pub fn new(key: SubjectKey, statement: impl Into<String>, strength: UnitScore) -> Self {
        Self {
            key,
            statement: statement.into(),
            strength,
        }
    }
}

/// An ordering the content implies between two already-recorded elements.
///
/// Elements are referenced by id and may be prior content or event lore.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderingClaim {
    /// The element the content presents as happening first.
    pub earlier: Uuid,
    /// The element the content presents as happening later.
    pub later: Uuid,
}

/// One narrative turn's worth of generated content.
///
/// Immutable once recorded; revised only through retroactive changes that
/// supersede the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeContent {
    /// Unique id of this version.
    pub id: Uuid,
    /// The session this content belongs to.
    pub session_id: Uuid,
    /// The narrative text.
    pub text: String,
    /// Monotonic narrative position within the session.
    pub position: u64,
    /// Names of entities the text refers to.
    pub referenced_entities: Vec<String>,
    /// Structured claims the text makes.
    pub assertions: Vec<Assertion>,
    /// Ids of prior content this item causally depends on.
    pub causal_links: Vec<Uuid>,
    /// Orderings the text implies between recorded elements.
    pub ordering_claims: Vec<OrderingClaim>,
    /// Theme and tone tags carried by the text.
    pub themes: Vec<String>,
    /// Version number within the record's supersede chain.
    pub version: u32,
    /// Id of the record that superseded this one, if any.
    pub superseded_by: Option<Uuid>,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
}

impl NarrativeContent {
    /// Creates a first-version content record with no claims attached.
    #[must_use]
    pub fn new(
        session_id: Uuid,
        text: impl Into<String>,
        position: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            text: text.into(),
            position,
            referenced_entities: Vec::new(),
            assertions: Vec::new(),
            causal_links: Vec::new(),
            ordering_claims: Vec::new(),
            themes: Vec::new(),
            version: 1,
            superseded_by: None,
            created_at,
        }
    }
}
