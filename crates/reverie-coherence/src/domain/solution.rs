//! Candidate solutions for reconciling a contradiction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reverie_core::scoring::SolutionScores;

use super::contradiction::ContradictionKind;

/// The narrative device a candidate solution uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SolutionType {
    /// Ground the departure in the character's inner life.
    CharacterDriven,
    /// Reframe one account as a limited or unreliable perspective.
    PerspectiveBased,
    /// Re-order or stretch the timeline itself.
    Temporal,
    /// Treat the conflicting account as misremembered.
    MemoryBased,
    /// Insert an unseen cause that links the broken chain.
    CausalBridge,
    /// Reveal a hidden factor that was operating all along.
    HiddenFactor,
    /// Recast the scene so the off-theme material belongs.
    Recontextualization,
    /// Let the dissonance stand as deliberate subtext.
    Subtext,
    /// Always-available ambiguity-embracing fallback.
    Universal,
}

impl SolutionType {
    /// Snake-case tag for logs and scoring requests.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CharacterDriven => "character_driven",
            Self::PerspectiveBased => "perspective_based",
            Self::Temporal => "temporal",
            Self::MemoryBased => "memory_based",
            Self::CausalBridge => "causal_bridge",
            Self::HiddenFactor => "hidden_factor",
            Self::Recontextualization => "recontextualization",
            Self::Subtext => "subtext",
            Self::Universal => "universal",
        }
    }

    /// The candidate solution types for a contradiction kind.
    ///
    /// The table is closed and `Universal` is always included, so every
    /// contradiction has at least one eligible candidate.
    #[must_use]
    pub fn candidates_for(kind: ContradictionKind) -> &'static [SolutionType] {
        match kind {
            ContradictionKind::Direct => {
                &[Self::CharacterDriven, Self::PerspectiveBased, Self::Universal]
            }
            ContradictionKind::Temporal => &[Self::Temporal, Self::MemoryBased, Self::Universal],
            ContradictionKind::Causal => {
                &[Self::CausalBridge, Self::HiddenFactor, Self::Universal]
            }
            ContradictionKind::Implicit => {
                &[Self::Recontextualization, Self::Subtext, Self::Universal]
            }
        }
    }
}

/// A scored, fully specified way to reconcile one contradiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeSolution {
    /// Candidate identifier.
    pub id: Uuid,
    /// The narrative device used.
    pub kind: SolutionType,
    /// What the solution does, out of fiction.
    pub description: String,
    /// Ordered steps to implement it. Never empty.
    pub implementation_steps: Vec<String>,
    /// Player-facing diegetic explanation. Never empty.
    pub in_world_explanation: String,
    /// Effectiveness, narrative cost, and player impact.
    pub scores: SolutionScores,
}
