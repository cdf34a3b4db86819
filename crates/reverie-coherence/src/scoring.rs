//! Rule-based scoring and the timeout fallback around pluggable scorers.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use reverie_core::error::CoherenceError;
use reverie_core::score::UnitScore;
use reverie_core::scoring::{ScoringRequest, ScoringStrategy, SolutionScores};

use crate::detection::text::overlap;

/// Deterministic keyword-heuristic scorer.
///
/// Always available and infallible: the generator falls back to it when the
/// configured strategy times out or fails, so a resolution is never blocked
/// on an external scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    /// Creates a rule-based scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scores a candidate from its solution kind, the contradiction's
    /// severity, and the lexical alignment of the two summaries.
    #[must_use]
    pub fn score(request: &ScoringRequest) -> SolutionScores {
        let (base_effectiveness, base_cost, base_impact) = match request.solution_kind.as_str() {
            "character_driven" => (0.75, 0.25, 0.30),
            "perspective_based" => (0.70, 0.20, 0.25),
            "temporal" => (0.65, 0.45, 0.35),
            "memory_based" => (0.60, 0.30, 0.40),
            "causal_bridge" => (0.70, 0.35, 0.20),
            "hidden_factor" => (0.65, 0.40, 0.25),
            "recontextualization" => (0.60, 0.25, 0.20),
            "subtext" => (0.55, 0.15, 0.10),
            _ => (0.50, 0.10, 0.15),
        };
        let severity_pressure = f64::from(request.severity_rank) / 3.0;
        let alignment = overlap(&request.solution_summary, &request.contradiction_summary);
        SolutionScores {
            effectiveness: UnitScore::new(base_effectiveness + 0.15 * alignment),
            narrative_cost: UnitScore::new(base_cost + 0.2 * severity_pressure),
            player_impact: UnitScore::new(base_impact + 0.2 * severity_pressure),
        }
    }
}

#[async_trait]
impl ScoringStrategy for RuleBasedScorer {
    async fn score_solution(
        &self,
        request: &ScoringRequest,
    ) -> Result<SolutionScores, CoherenceError> {
        Ok(Self::score(request))
    }
}

/// Calls the primary scorer under a timeout; on timeout or failure, degrades
/// to the rule-based scorer. Scores are already clamped by construction.
pub(crate) async fn score_with_fallback(
    primary: &dyn ScoringStrategy,
    timeout: Duration,
    request: &ScoringRequest,
) -> SolutionScores {
    match tokio::time::timeout(timeout, primary.score_solution(request)).await {
        Ok(Ok(scores)) => scores,
        Ok(Err(err)) => {
            warn!(error = %err, kind = %request.solution_kind, "scorer failed, using rule-based fallback");
            RuleBasedScorer::score(request)
        }
        Err(_) => {
            warn!(kind = %request.solution_kind, "scorer timed out, using rule-based fallback");
            RuleBasedScorer::score(request)
        }
    }
}
