//! Direct contradiction strategy: asserted values vs. established facts.

use reverie_canon::{Immutability, NarrativeContent, SessionCanon};
use reverie_core::error::CoherenceError;
use reverie_core::score::UnitScore;

use crate::config::DetectionConfig;
use crate::domain::contradiction::{
    ConflictingElement, Contradiction, ContradictionKind, Severity,
};

use super::text::{opposes, overlap};
use super::DetectionStrategy;

/// Matches each assertion against lore heads sharing its subject+attribute
/// key. Two statements about the same key are mutually exclusive when their
/// lexical overlap falls below the configured threshold or one negates the
/// other; confidence is the assertion strength weighted by how far apart
/// the statements are.
#[derive(Debug, Default)]
pub(crate) struct DirectStrategy;

impl DetectionStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn run(
        &self,
        content: &NarrativeContent,
        canon: &SessionCanon,
        config: &DetectionConfig,
    ) -> Result<Vec<Contradiction>, CoherenceError> {
        let mut found = Vec::new();
        for assertion in &content.assertions {
            for lore in canon.lore_heads_for(&assertion.key) {
                let shared = overlap(&assertion.statement, &lore.fact);
                let exclusive = shared < config.exclusivity_overlap_threshold
                    || opposes(&assertion.statement, &lore.fact);
                if !exclusive {
                    continue;
                }
                let severity = if lore.immutability == Immutability::HardCanon {
                    Severity::Critical
                } else {
                    Severity::Error
                };
                let confidence = UnitScore::new(assertion.strength.value() * (1.0 - shared));
                found.push(Contradiction::new(
                    ContradictionKind::Direct,
                    severity,
                    format!(
                        "content asserts '{}' about {}, but canon holds '{}'",
                        assertion.statement, assertion.key, lore.fact
                    ),
                    vec![
                        ConflictingElement {
                            id: lore.id,
                            summary: lore.fact.clone(),
                        },
                        ConflictingElement {
                            id: content.id,
                            summary: assertion.statement.clone(),
                        },
                    ],
                    confidence,
                ));
            }
        }
        Ok(found)
    }
}
