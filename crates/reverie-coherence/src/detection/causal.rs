//! Causal validation: dependency links must point backward to real elements.

use uuid::Uuid;

use reverie_canon::{NarrativeContent, SessionCanon};
use reverie_core::error::CoherenceError;
use reverie_core::score::UnitScore;

use crate::config::DetectionConfig;
use crate::domain::contradiction::{
    ConflictingElement, Contradiction, ContradictionKind, Severity,
};

use super::DetectionStrategy;

const MISSING_LINK_CONFIDENCE: f64 = 1.0;
const FORWARD_LINK_CONFIDENCE: f64 = 0.95;

/// Validates causal structure.
///
/// Used by full detection for the content's own causal links, and callable
/// on its own for targeted chain checks such as quest prerequisites.
#[derive(Debug, Clone, Copy, Default)]
pub struct CausalValidator;

impl CausalValidator {
    /// Creates a validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks every causal link on `content`: the linked element must exist
    /// and sit at a strictly earlier narrative position.
    #[must_use]
    pub fn validate_links(
        &self,
        content: &NarrativeContent,
        canon: &SessionCanon,
    ) -> Vec<Contradiction> {
        let mut found = Vec::new();
        for &link in &content.causal_links {
            match canon.position_of(link) {
                None => found.push(missing_link(link, content)),
                Some(pos) if pos >= content.position => {
                    found.push(forward_link(link, pos, content, canon));
                }
                Some(_) => {}
            }
        }
        found
    }

    /// Checks an explicit prerequisite chain: every id must exist and the
    /// recorded positions must be strictly increasing along the chain.
    #[must_use]
    pub fn validate_chain(&self, chain: &[Uuid], canon: &SessionCanon) -> Vec<Contradiction> {
        let mut found = Vec::new();
        for pair in chain.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            match (canon.position_of(from), canon.position_of(to)) {
                (Some(from_pos), Some(to_pos)) if from_pos >= to_pos => {
                    found.push(Contradiction::new(
                        ContradictionKind::Causal,
                        Severity::Error,
                        format!(
                            "chain step at position {to_pos} depends on a step recorded later at {from_pos}"
                        ),
                        vec![
                            element(from, canon),
                            element(to, canon),
                        ],
                        UnitScore::new(FORWARD_LINK_CONFIDENCE),
                    ));
                }
                (Some(_), Some(_)) => {}
                (None, _) => found.push(missing_chain_step(from)),
                (_, None) => found.push(missing_chain_step(to)),
            }
        }
        found
    }
}

fn missing_chain_step(missing: Uuid) -> Contradiction {
    Contradiction::new(
        ContradictionKind::Causal,
        Severity::Error,
        format!("chain references unknown element {missing}"),
        vec![ConflictingElement {
            id: missing,
            summary: "<unknown element>".to_owned(),
        }],
        UnitScore::new(MISSING_LINK_CONFIDENCE),
    )
}

fn element(id: Uuid, canon: &SessionCanon) -> ConflictingElement {
    ConflictingElement {
        id,
        summary: canon.text_of(id).unwrap_or("<unknown element>").to_owned(),
    }
}

fn missing_link(link: Uuid, content: &NarrativeContent) -> Contradiction {
    Contradiction::new(
        ContradictionKind::Causal,
        Severity::Error,
        format!("content depends causally on unknown element {link}"),
        vec![
            ConflictingElement {
                id: link,
                summary: "<unknown element>".to_owned(),
            },
            ConflictingElement {
                id: content.id,
                summary: content.text.clone(),
            },
        ],
        UnitScore::new(MISSING_LINK_CONFIDENCE),
    )
}

fn forward_link(
    link: Uuid,
    link_pos: u64,
    content: &NarrativeContent,
    canon: &SessionCanon,
) -> Contradiction {
    Contradiction::new(
        ContradictionKind::Causal,
        Severity::Error,
        format!(
            "content at position {} depends on an element not established until position {link_pos}",
            content.position
        ),
        vec![
            element(link, canon),
            ConflictingElement {
                id: content.id,
                summary: content.text.clone(),
            },
        ],
        UnitScore::new(FORWARD_LINK_CONFIDENCE),
    )
}

/// Full-detection wrapper around [`CausalValidator`].
#[derive(Debug, Default)]
pub(crate) struct CausalStrategy {
    validator: CausalValidator,
}

impl DetectionStrategy for CausalStrategy {
    fn name(&self) -> &'static str {
        "causal"
    }

    fn run(
        &self,
        content: &NarrativeContent,
        canon: &SessionCanon,
        _config: &DetectionConfig,
    ) -> Result<Vec<Contradiction>, CoherenceError> {
        Ok(self.validator.validate_links(content, canon))
    }
}
