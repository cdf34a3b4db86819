//! Pluggable solution-scoring strategy.
//!
//! Scoring is the one place the engine suspends: a strategy may call out to
//! an external semantic-similarity service or model. Callers wrap the call
//! in a timeout and fall back to a rule-based scorer on timeout or failure,
//! so a slow or broken scorer never blocks a resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoherenceError;
use crate::score::UnitScore;

/// The three bounded scores produced for one candidate solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolutionScores {
    /// How well the candidate dissolves the contradiction.
    pub effectiveness: UnitScore,
    /// How much established narrative the candidate disturbs.
    pub narrative_cost: UnitScore,
    /// How visible the repair is to the player.
    pub player_impact: UnitScore,
}

/// Everything a scoring strategy may consider for one candidate.
///
/// Carried as plain text plus a severity rank so strategies stay decoupled
/// from the engine's domain types.
#[derive(Debug, Clone)]
pub struct ScoringRequest {
    /// Description of the contradiction being resolved.
    pub contradiction_summary: String,
    /// Severity rank of the contradiction, `0` (info) through `3` (critical).
    pub severity_rank: u8,
    /// Snake-case tag of the candidate's solution type.
    pub solution_kind: String,
    /// The candidate's description.
    pub solution_summary: String,
}

/// Strategy interface for scoring candidate solutions.
///
/// Implementations range from deterministic keyword heuristics to
/// learned/LLM-backed scorers; all are interchangeable behind this contract.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    /// Scores one candidate solution against the contradiction it targets.
    ///
    /// # Errors
    ///
    /// Returns an error when the strategy cannot produce scores (for
    /// example, an upstream service failure). Callers degrade to a
    /// rule-based fallback rather than propagating.
    async fn score_solution(
        &self,
        request: &ScoringRequest,
    ) -> Result<SolutionScores, CoherenceError>;
}
