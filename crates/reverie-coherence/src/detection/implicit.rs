//! Implicit contradiction strategy: theme/tone drift from active storylines.

use reverie_canon::{NarrativeContent, SessionCanon};
use reverie_core::error::CoherenceError;
use reverie_core::score::UnitScore;

use crate::config::DetectionConfig;
use crate::domain::contradiction::{
    ConflictingElement, Contradiction, ContradictionKind, Severity,
};

use super::text::tag_overlap;
use super::DetectionStrategy;

const IMPLICIT_CONFIDENCE_WEIGHT: f64 = 0.6;

/// Compares the content's theme tags against the best-matching active
/// thread. Heuristic rather than factual, so findings default to
/// `Warning` severity. Contents without themes are skipped.
#[derive(Debug, Default)]
pub(crate) struct ImplicitStrategy;

impl DetectionStrategy for ImplicitStrategy {
    fn name(&self) -> &'static str {
        "implicit"
    }

    fn run(
        &self,
        content: &NarrativeContent,
        canon: &SessionCanon,
        config: &DetectionConfig,
    ) -> Result<Vec<Contradiction>, CoherenceError> {
        if content.themes.is_empty() {
            return Ok(Vec::new());
        }

        // Thread iteration is in stable id order, so tie-breaking between
        // equally close threads is deterministic across passes.
        let best = canon
            .threads()
            .filter(|thread| !thread.themes.is_empty())
            .map(|thread| {
                let shared = tag_overlap(
                    content.themes.iter().map(String::as_str),
                    thread.themes.iter().map(String::as_str),
                );
                (thread, shared)
            })
            .max_by(|(_, a), (_, b)| a.total_cmp(b));

        let Some((thread, shared)) = best else {
            return Ok(Vec::new());
        };
        if shared >= config.implicit_theme_overlap_threshold {
            return Ok(Vec::new());
        }

        let confidence = UnitScore::new(IMPLICIT_CONFIDENCE_WEIGHT * (1.0 - shared));
        Ok(vec![Contradiction::new(
            ContradictionKind::Implicit,
            Severity::Warning,
            format!(
                "content themes [{}] drift from every active storyline; closest is '{}' with themes [{}]",
                content.themes.join(", "),
                thread.title,
                thread.themes.iter().cloned().collect::<Vec<_>>().join(", "),
            ),
            vec![
                ConflictingElement {
                    id: thread.id,
                    summary: thread.title.clone(),
                },
                ConflictingElement {
                    id: content.id,
                    summary: content.themes.join(", "),
                },
            ],
            confidence,
        )])
    }
}
