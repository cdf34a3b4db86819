//! Contradiction detection.
//!
//! Four strategies run independently against the current canon snapshot and
//! their findings are unioned. A failure inside one strategy degrades to a
//! warning-level consistency issue; the remaining strategies still run, so
//! detection never aborts wholesale.

mod causal;
mod direct;
mod implicit;
mod temporal;
pub(crate) mod text;

use tracing::warn;

use reverie_canon::{NarrativeContent, SessionCanon};
use reverie_core::error::CoherenceError;

use crate::config::DetectionConfig;
use crate::domain::contradiction::{ConsistencyIssue, Contradiction, Severity};

pub use causal::CausalValidator;
use causal::CausalStrategy;
use direct::DirectStrategy;
use implicit::ImplicitStrategy;
use temporal::TemporalStrategy;

/// One detection strategy, run in isolation over content and canon.
pub(crate) trait DetectionStrategy: Send + Sync {
    /// Strategy name, used in degradation issues and logs.
    fn name(&self) -> &'static str;

    /// Runs the strategy. Must be a pure function of its inputs.
    fn run(
        &self,
        content: &NarrativeContent,
        canon: &SessionCanon,
        config: &DetectionConfig,
    ) -> Result<Vec<Contradiction>, CoherenceError>;
}

/// Unioned result of one detection pass.
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    /// Detected contradictions, severity then confidence descending.
    pub contradictions: Vec<Contradiction>,
    /// Non-contradiction issues, including degraded strategies.
    pub issues: Vec<ConsistencyIssue>,
}

/// Runs all detection strategies and unions their findings.
///
/// `detect` is a pure function of the content and the canon snapshot:
/// identical inputs always produce the same multiset of
/// (kind, elements, severity), though the result ids are fresh per pass.
pub struct ContradictionDetector {
    config: DetectionConfig,
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl ContradictionDetector {
    /// Creates a detector with the standard four strategies.
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            strategies: vec![
                Box::new(DirectStrategy),
                Box::new(TemporalStrategy),
                Box::new(CausalStrategy::default()),
                Box::new(ImplicitStrategy),
            ],
        }
    }

    #[cfg(test)]
    pub(crate) fn with_strategies(
        config: DetectionConfig,
        strategies: Vec<Box<dyn DetectionStrategy>>,
    ) -> Self {
        Self { config, strategies }
    }

    /// Runs every strategy over `content` against `canon` and unions the
    /// findings, ordered by severity descending then confidence descending.
    #[must_use]
    pub fn detect(&self, content: &NarrativeContent, canon: &SessionCanon) -> DetectionOutcome {
        let mut outcome = DetectionOutcome::default();
        for strategy in &self.strategies {
            match strategy.run(content, canon, &self.config) {
                Ok(mut found) => outcome.contradictions.append(&mut found),
                Err(err) => {
                    warn!(strategy = strategy.name(), error = %err, "detection strategy degraded");
                    outcome.issues.push(ConsistencyIssue {
                        severity: Severity::Warning,
                        source: format!("detection.{}", strategy.name()),
                        message: err.to_string(),
                    });
                }
            }
        }
        outcome.contradictions.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(b.confidence.total_cmp(a.confidence))
                .then(a.kind.as_str().cmp(b.kind.as_str()))
                .then(a.identity().elements.cmp(&b.identity().elements))
        });
        outcome
    }
}

/// Rejects malformed content before detection runs.
///
/// # Errors
///
/// Returns `CoherenceError::InputValidation` for empty text, an assertion
/// with an empty statement, a self-referential causal link, or an ordering
/// claim relating an element to itself.
pub fn validate_content_shape(content: &NarrativeContent) -> Result<(), CoherenceError> {
    if content.text.trim().is_empty() {
        return Err(CoherenceError::InputValidation(
            "content text must not be empty".to_owned(),
        ));
    }
    if content
        .assertions
        .iter()
        .any(|assertion| assertion.statement.trim().is_empty())
    {
        return Err(CoherenceError::InputValidation(
            "assertions must carry a non-empty statement".to_owned(),
        ));
    }
    if content.causal_links.contains(&content.id) {
        return Err(CoherenceError::InputValidation(
            "content cannot causally depend on itself".to_owned(),
        ));
    }
    if content
        .ordering_claims
        .iter()
        .any(|claim| claim.earlier == claim.later)
    {
        return Err(CoherenceError::InputValidation(
            "ordering claims must relate two distinct elements".to_owned(),
        ));
    }
    Ok(())
}
