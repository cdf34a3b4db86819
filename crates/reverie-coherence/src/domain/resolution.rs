//! The outcome of resolving one contradiction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::solution::CreativeSolution;

/// A resolved (or attempted) contradiction, returned to the caller to be
/// merged into the player-visible narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeResolution {
    /// Resolution identifier.
    pub id: Uuid,
    /// The contradiction this resolves.
    pub conflict_id: Uuid,
    /// The solution that was chosen.
    pub solution: CreativeSolution,
    /// Set only after the retroactive change manager accepted the derived
    /// changes; solution selection alone never marks success.
    pub implementation_success: bool,
    /// Player-facing diegetic explanation.
    pub player_explanation: String,
    /// The narrative changes that were actually applied.
    pub narrative_changes: Vec<String>,
}

impl NarrativeResolution {
    /// Wraps a chosen solution, pending commit.
    #[must_use]
    pub fn pending(conflict_id: Uuid, solution: CreativeSolution) -> Self {
        let player_explanation = solution.in_world_explanation.clone();
        Self {
            id: Uuid::new_v4(),
            conflict_id,
            solution,
            implementation_success: false,
            player_explanation,
            narrative_changes: Vec::new(),
        }
    }
}
