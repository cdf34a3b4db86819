//! Temporal contradiction strategy: implied orderings vs. recorded positions.

use reverie_canon::{NarrativeContent, SessionCanon};
use reverie_core::error::CoherenceError;
use reverie_core::score::UnitScore;

use crate::config::DetectionConfig;
use crate::domain::contradiction::{
    ConflictingElement, Contradiction, ContradictionKind, Severity,
};

use super::DetectionStrategy;

const TEMPORAL_CONFIDENCE: f64 = 0.9;

/// Checks every ordering the content implies against the elements'
/// recorded narrative positions. Claims referencing unknown ids are
/// skipped; the causal strategy owns missing-reference reporting.
#[derive(Debug, Default)]
pub(crate) struct TemporalStrategy;

impl DetectionStrategy for TemporalStrategy {
    fn name(&self) -> &'static str {
        "temporal"
    }

    fn run(
        &self,
        content: &NarrativeContent,
        canon: &SessionCanon,
        _config: &DetectionConfig,
    ) -> Result<Vec<Contradiction>, CoherenceError> {
        let mut found = Vec::new();
        for claim in &content.ordering_claims {
            let (Some(earlier_pos), Some(later_pos)) =
                (canon.position_of(claim.earlier), canon.position_of(claim.later))
            else {
                continue;
            };
            if earlier_pos < later_pos {
                continue;
            }
            let summary_of = |id| canon.text_of(id).unwrap_or("<unknown>").to_owned();
            found.push(Contradiction::new(
                ContradictionKind::Temporal,
                Severity::Error,
                format!(
                    "content places '{}' before '{}', but canon records positions {earlier_pos} and {later_pos}",
                    summary_of(claim.earlier),
                    summary_of(claim.later),
                ),
                vec![
                    ConflictingElement {
                        id: claim.earlier,
                        summary: summary_of(claim.earlier),
                    },
                    ConflictingElement {
                        id: claim.later,
                        summary: summary_of(claim.later),
                    },
                ],
                UnitScore::new(TEMPORAL_CONFIDENCE),
            ));
        }
        Ok(found)
    }
}
