//! Turns a contradiction into ranked candidate solutions.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use reverie_core::error::CoherenceError;
use reverie_core::scoring::{ScoringRequest, ScoringStrategy};

use crate::config::SelectionConfig;
use crate::domain::contradiction::Contradiction;
use crate::domain::solution::{CreativeSolution, SolutionType};
use crate::scoring::score_with_fallback;

struct SolutionDraft {
    description: String,
    implementation_steps: Vec<String>,
    in_world_explanation: String,
}

/// Generates scored candidate solutions for a contradiction.
///
/// Candidate types come from the closed kind-to-solution mapping, with the
/// universal fallback always eligible. A candidate that cannot carry
/// non-empty implementation steps and an in-world explanation is dropped,
/// never emitted empty.
pub struct CreativeSolutionGenerator {
    scorer: Arc<dyn ScoringStrategy>,
    selection: SelectionConfig,
    scoring_timeout: Duration,
}

impl CreativeSolutionGenerator {
    /// Creates a generator around a pluggable scorer.
    #[must_use]
    pub fn new(
        scorer: Arc<dyn ScoringStrategy>,
        selection: SelectionConfig,
        scoring_timeout: Duration,
    ) -> Self {
        Self {
            scorer,
            selection,
            scoring_timeout,
        }
    }

    /// Generates candidates for `contradiction`, ranked best first.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::ResolutionRejected` if no candidate could be
    /// fully specified — the universal template makes this unreachable in
    /// practice, but the contract is kept explicit.
    pub async fn generate(
        &self,
        contradiction: &Contradiction,
    ) -> Result<Vec<CreativeSolution>, CoherenceError> {
        let mut candidates = Vec::new();
        for kind in SolutionType::candidates_for(contradiction.kind) {
            let draft = draft_for(*kind, contradiction);
            if draft.implementation_steps.is_empty()
                || draft.in_world_explanation.trim().is_empty()
            {
                debug!(kind = kind.as_str(), "dropping underspecified candidate");
                continue;
            }
            let request = ScoringRequest {
                contradiction_summary: contradiction.description.clone(),
                severity_rank: contradiction.severity.rank(),
                solution_kind: kind.as_str().to_owned(),
                solution_summary: draft.description.clone(),
            };
            let scores =
                score_with_fallback(self.scorer.as_ref(), self.scoring_timeout, &request).await;
            candidates.push(CreativeSolution {
                id: Uuid::new_v4(),
                kind: *kind,
                description: draft.description,
                implementation_steps: draft.implementation_steps,
                in_world_explanation: draft.in_world_explanation,
                scores,
            });
        }
        if candidates.is_empty() {
            return Err(CoherenceError::ResolutionRejected(format!(
                "no candidate could be specified for contradiction {}",
                contradiction.id
            )));
        }
        super::rank(&mut candidates, &self.selection);
        Ok(candidates)
    }
}

fn claims(contradiction: &Contradiction) -> (String, String) {
    let established = contradiction
        .elements
        .first()
        .map_or_else(|| contradiction.description.clone(), |e| e.summary.clone());
    let incoming = contradiction
        .elements
        .last()
        .map_or_else(|| contradiction.description.clone(), |e| e.summary.clone());
    (established, incoming)
}

fn draft_for(kind: SolutionType, contradiction: &Contradiction) -> SolutionDraft {
    let (established, incoming) = claims(contradiction);
    match kind {
        SolutionType::CharacterDriven => SolutionDraft {
            description: format!(
                "Ground the departure in the character's inner life so that '{incoming}' becomes deliberate growth rather than an error"
            ),
            implementation_steps: vec![
                "Name the motivation that lets both accounts be true at once".to_owned(),
                format!("Write a brief interior beat acknowledging that '{established}'"),
                "Show the visible cost of acting against the established trait".to_owned(),
            ],
            in_world_explanation: format!(
                "It has long been true that {established} — and that is exactly why this moment matters: they act in spite of it, hands shaking, because something larger is at stake."
            ),
        },
        SolutionType::PerspectiveBased => SolutionDraft {
            description: "Reframe one account as a limited or unreliable perspective".to_owned(),
            implementation_steps: vec![
                "Attribute the earlier account to a specific witness or narrator".to_owned(),
                "Surface a detail that witness could not have seen".to_owned(),
                "Let the new account stand as the fuller view without declaring the old one false".to_owned(),
            ],
            in_world_explanation: format!(
                "No two witnesses carry the same story. What was told before — that {established} — was one vantage; this is another, and the truth sits between them."
            ),
        },
        SolutionType::Temporal => SolutionDraft {
            description: "Stretch or re-anchor the timeline so both accounts fit in order".to_owned(),
            implementation_steps: vec![
                "Establish how much time actually passed between the two moments".to_owned(),
                "Insert a scene marker anchoring each account to its own moment".to_owned(),
                "Reconcile any dependent references to the corrected order".to_owned(),
            ],
            in_world_explanation: "Time in the telling is not time in the world; these events lay farther apart than they first appeared, and in their true order everything holds.".to_owned(),
        },
        SolutionType::MemoryBased => SolutionDraft {
            description: "Treat the conflicting account as honestly misremembered".to_owned(),
            implementation_steps: vec![
                "Choose whose memory carried the distortion and why it would".to_owned(),
                "Show a small, human reason for the slip — grief, distance, retelling".to_owned(),
                "Let the corrected memory surface naturally in play".to_owned(),
            ],
            in_world_explanation: format!(
                "Memory bends under feeling. The account that {established} was remembered as it was felt, not as it happened."
            ),
        },
        SolutionType::CausalBridge => SolutionDraft {
            description: "Insert an unseen cause that links the broken chain".to_owned(),
            implementation_steps: vec![
                "Identify the smallest fact that would make the dependency sound".to_owned(),
                "Plant that fact just before the dependent moment".to_owned(),
                "Acknowledge it briefly when the dependency next comes up".to_owned(),
            ],
            in_world_explanation: format!(
                "An unseen thread ran between these moments all along; only now does it catch the light: {incoming}."
            ),
        },
        SolutionType::HiddenFactor => SolutionDraft {
            description: "Reveal a hidden factor that was operating from the start".to_owned(),
            implementation_steps: vec![
                "Choose an agent or force plausibly present but unnoticed".to_owned(),
                "Seed one earlier trace of it so the reveal feels earned".to_owned(),
                "Reveal its hand as the explanation for the impossible step".to_owned(),
            ],
            in_world_explanation: "Something was at work beneath the surface the whole time, patient and unnoticed, and this is the first mark it has left in the open.".to_owned(),
        },
        SolutionType::Recontextualization => SolutionDraft {
            description: "Recast the scene so the off-theme material belongs to the story".to_owned(),
            implementation_steps: vec![
                "Name the thematic thread the moment can serve".to_owned(),
                "Tie one image or line in the scene back to that thread".to_owned(),
                "Carry the connection forward in the next beat".to_owned(),
            ],
            in_world_explanation: format!(
                "Seen in the light of what this story is truly about, the moment belongs: {incoming} is another face of the same struggle."
            ),
        },
        SolutionType::Subtext => SolutionDraft {
            description: "Let the dissonance stand as deliberate subtext".to_owned(),
            implementation_steps: vec![
                "Keep the surface of the scene unchanged".to_owned(),
                "Add one understated cue that the dissonance is noticed in-world".to_owned(),
                "Reserve the tension for a later payoff".to_owned(),
            ],
            in_world_explanation: "Not everything in a story announces itself. The wrongness is felt by those within it too — a held breath, an exchanged glance — and it will mean something, later.".to_owned(),
        },
        SolutionType::Universal => SolutionDraft {
            description: "Hold both accounts in deliberate ambiguity until a reconciliation is earned".to_owned(),
            implementation_steps: vec![
                "Acknowledge both accounts without privileging either".to_owned(),
                "Pose an open question in-world that invites probing the tension".to_owned(),
                "Defer the reconciliation to a later scene where it can be earned".to_owned(),
            ],
            in_world_explanation: "A story can hold more than one truth at a time. The conflict between what was known and what has just happened is not an error to erase but a depth to explore.".to_owned(),
        },
    }
}
