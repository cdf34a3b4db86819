//! The orchestrating façade.
//!
//! `CoherenceValidator` is the only entry point external collaborators
//! should depend on. It wires detection, solution search, retroactive
//! commits, and convergence analysis over the shared canon store.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use reverie_canon::{
    AuditLog, CanonStore, ChangeKind, NarrativeContent, RetroactiveChange, SessionCanon,
    StorylineThread,
};
use reverie_core::clock::Clock;
use reverie_core::error::CoherenceError;
use reverie_core::scoring::ScoringStrategy;

use crate::config::CoherenceConfig;
use crate::convergence::StorylineConvergenceValidator;
use crate::detection::{validate_content_shape, ContradictionDetector};
use crate::domain::contradiction::{ConsistencyIssue, Contradiction, Severity};
use crate::domain::convergence::ConvergenceValidation;
use crate::domain::resolution::NarrativeResolution;
use crate::domain::solution::{CreativeSolution, SolutionType};
use crate::retcon::RetroactiveChangeManager;
use crate::solutions::{CreativeSolutionGenerator, SolutionSelector};

/// Result of validating one content item against canon.
#[derive(Debug, Serialize)]
pub struct ValidationResult {
    /// The validated content.
    pub content_id: Uuid,
    /// Detected contradictions, severity then confidence descending.
    pub contradictions: Vec<Contradiction>,
    /// Generic issues, including degraded detection strategies.
    pub issues: Vec<ConsistencyIssue>,
}

impl ValidationResult {
    /// True when no contradictions were detected.
    #[must_use]
    pub fn is_coherent(&self) -> bool {
        self.contradictions.is_empty()
    }

    /// True when an unresolved critical contradiction blocks surfacing the
    /// content to players until a resolution is applied.
    #[must_use]
    pub fn blocks_surfacing(&self) -> bool {
        self.contradictions
            .iter()
            .any(|c| c.severity == Severity::Critical)
    }
}

/// Façade over the coherence engine.
pub struct CoherenceValidator {
    canon: Arc<CanonStore>,
    detector: ContradictionDetector,
    generator: CreativeSolutionGenerator,
    selector: SolutionSelector,
    retcon: RetroactiveChangeManager,
    convergence: StorylineConvergenceValidator,
}

impl CoherenceValidator {
    /// Wires the engine over a canon store, a pluggable scorer, and a clock.
    #[must_use]
    pub fn new(
        config: CoherenceConfig,
        canon: Arc<CanonStore>,
        scorer: Arc<dyn ScoringStrategy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let audit = Arc::new(AuditLog::new());
        Self {
            canon,
            detector: ContradictionDetector::new(config.detection.clone()),
            generator: CreativeSolutionGenerator::new(
                scorer,
                config.selection.clone(),
                Duration::from_millis(config.scoring.timeout_ms),
            ),
            selector: SolutionSelector::new(config.selection.clone()),
            retcon: RetroactiveChangeManager::new(config.detection, audit, clock),
            convergence: StorylineConvergenceValidator::new(config.convergence),
        }
    }

    /// The canon store the engine reads and revises.
    #[must_use]
    pub fn canon(&self) -> Arc<CanonStore> {
        Arc::clone(&self.canon)
    }

    /// The audit log of applied retroactive changes.
    #[must_use]
    pub fn audit(&self) -> Arc<AuditLog> {
        self.retcon.audit()
    }

    /// Validates newly generated content against the session's canon.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::InputValidation` for malformed content;
    /// detection itself never fails wholesale.
    #[instrument(skip(self, content), fields(content_id = %content.id, session_id = %content.session_id))]
    pub async fn validate_content(
        &self,
        content: &NarrativeContent,
    ) -> Result<ValidationResult, CoherenceError> {
        validate_content_shape(content)?;
        let session = self.canon.session(content.session_id);
        let guard = session.read().await;
        let outcome = self.detector.detect(content, &guard);
        info!(
            contradictions = outcome.contradictions.len(),
            issues = outcome.issues.len(),
            "content validated"
        );
        Ok(ValidationResult {
            content_id: content.id,
            contradictions: outcome.contradictions,
            issues: outcome.issues,
        })
    }

    /// Resolves one contradiction: generates candidates, selects a solution,
    /// derives the retroactive changes it needs, and commits them.
    ///
    /// Commit rejection is reported through
    /// `implementation_success = false` on the returned resolution, never as
    /// an error — the upstream generator always receives an answer.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::ResolutionRejected` only when no candidate
    /// solution could be produced at all.
    #[instrument(skip(self, content, contradiction), fields(conflict_id = %contradiction.id))]
    pub async fn resolve_conflict(
        &self,
        content: &NarrativeContent,
        contradiction: &Contradiction,
    ) -> Result<NarrativeResolution, CoherenceError> {
        let candidates = self.generator.generate(contradiction).await?;
        let solution = self.selector.select(&candidates)?;
        info!(kind = solution.kind.as_str(), "solution selected");

        let session = self.canon.session(content.session_id);
        let changes = {
            let guard = session.read().await;
            derive_changes(&solution, contradiction, &guard)
        };

        let mut resolution = NarrativeResolution::pending(contradiction.id, solution);
        let commit = self
            .retcon
            .commit(&session, resolution.id, contradiction, content, &changes)
            .await;
        resolution.implementation_success = commit.applied;
        if commit.applied {
            resolution.narrative_changes = resolution.solution.implementation_steps.clone();
        } else if let Some(reason) = &commit.rejected_reason {
            warn!(%reason, "retroactive changes rejected; resolution returned unapplied");
        }
        Ok(resolution)
    }

    /// Resolves contradictions strictly in the given (detection) order, so a
    /// later issue is never resolved before an earlier one that might
    /// invalidate it.
    ///
    /// # Errors
    ///
    /// Returns the first `CoherenceError::ResolutionRejected` raised while
    /// generating candidates.
    pub async fn resolve_conflicts(
        &self,
        content: &NarrativeContent,
        contradictions: &[Contradiction],
    ) -> Result<Vec<NarrativeResolution>, CoherenceError> {
        let mut resolutions = Vec::with_capacity(contradictions.len());
        for contradiction in contradictions {
            resolutions.push(self.resolve_conflict(content, contradiction).await?);
        }
        Ok(resolutions)
    }

    /// Analyzes the given threads for convergence.
    #[must_use]
    pub fn validate_convergence(
        &self,
        threads: &[StorylineThread],
        session_id: Uuid,
    ) -> ConvergenceValidation {
        self.convergence.validate(threads, session_id)
    }

    /// Analyzes the session's stored threads for convergence.
    pub async fn validate_session_convergence(&self, session_id: Uuid) -> ConvergenceValidation {
        let session = self.canon.session(session_id);
        let guard = session.read().await;
        let threads: Vec<StorylineThread> = guard.threads().cloned().collect();
        self.convergence.validate(&threads, session_id)
    }
}

/// Derives the retroactive changes a chosen solution requires.
///
/// Bridge-building solutions add new canon; every other kind attaches the
/// in-world explanation as an annotation. Elements that are not in canon
/// (the incoming content itself) need no change.
fn derive_changes(
    solution: &CreativeSolution,
    contradiction: &Contradiction,
    canon: &SessionCanon,
) -> Vec<RetroactiveChange> {
    let kind = match solution.kind {
        SolutionType::CausalBridge | SolutionType::HiddenFactor => ChangeKind::Addition,
        _ => ChangeKind::Annotation,
    };
    contradiction
        .elements
        .iter()
        .filter_map(|element| {
            canon.text_of(element.id).map(|original| {
                RetroactiveChange::new(
                    element.id,
                    kind,
                    original,
                    solution.in_world_explanation.clone(),
                    solution.description.clone(),
                    solution.in_world_explanation.clone(),
                )
            })
        })
        .collect()
}
