//! Picks the solution to implement from a candidate list.

use reverie_core::error::CoherenceError;

use crate::config::SelectionConfig;
use crate::domain::solution::{CreativeSolution, SolutionType};

/// Composite score:
/// `effectiveness * w1 - narrative_cost * w2 - player_impact * w3`.
fn composite_of(solution: &CreativeSolution, config: &SelectionConfig) -> f64 {
    solution.scores.effectiveness.value() * config.effectiveness_weight
        - solution.scores.narrative_cost.value() * config.cost_weight
        - solution.scores.player_impact.value() * config.impact_weight
}

/// Orders candidates best first: composite descending, ties broken by lower
/// narrative cost, then lexicographic solution type for determinism.
pub(crate) fn rank(candidates: &mut [CreativeSolution], config: &SelectionConfig) {
    candidates.sort_by(|a, b| {
        composite_of(b, config)
            .total_cmp(&composite_of(a, config))
            .then(a.scores.narrative_cost.total_cmp(b.scores.narrative_cost))
            .then(a.kind.as_str().cmp(b.kind.as_str()))
    });
}

/// Selects one solution from a ranked candidate list.
pub struct SolutionSelector {
    config: SelectionConfig,
}

impl SolutionSelector {
    /// Creates a selector with the given weights.
    #[must_use]
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// The composite score of a candidate under this selector's weights.
    #[must_use]
    pub fn composite(&self, solution: &CreativeSolution) -> f64 {
        composite_of(solution, &self.config)
    }

    /// Picks the best candidate. When no candidate clears the acceptance
    /// threshold, the always-eligible universal candidate is used instead.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::ResolutionRejected` when the list is empty,
    /// or when nothing clears the bar and no universal candidate exists.
    pub fn select(
        &self,
        candidates: &[CreativeSolution],
    ) -> Result<CreativeSolution, CoherenceError> {
        let mut ranked = candidates.to_vec();
        rank(&mut ranked, &self.config);

        let best = ranked.first().ok_or_else(|| {
            CoherenceError::ResolutionRejected("no candidate solutions to select from".to_owned())
        })?;

        if self.composite(best) >= self.config.acceptance_threshold {
            return Ok(best.clone());
        }

        ranked
            .iter()
            .find(|candidate| candidate.kind == SolutionType::Universal)
            .cloned()
            .ok_or_else(|| {
                CoherenceError::ResolutionRejected(
                    "no candidate cleared the acceptance bar and no universal fallback was generated"
                        .to_owned(),
                )
            })
    }
}
