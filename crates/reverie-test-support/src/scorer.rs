//! Test scorers — mock `ScoringStrategy` implementations for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reverie_core::error::CoherenceError;
use reverie_core::score::UnitScore;
use reverie_core::scoring::{ScoringRequest, ScoringStrategy, SolutionScores};

/// A scorer that returns the same scores for every candidate.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub SolutionScores);

impl FixedScorer {
    /// A scorer returning moderately favorable scores.
    #[must_use]
    pub fn favorable() -> Self {
        Self(SolutionScores {
            effectiveness: UnitScore::new(0.8),
            narrative_cost: UnitScore::new(0.2),
            player_impact: UnitScore::new(0.1),
        })
    }
}

#[async_trait]
impl ScoringStrategy for FixedScorer {
    async fn score_solution(
        &self,
        _request: &ScoringRequest,
    ) -> Result<SolutionScores, CoherenceError> {
        Ok(self.0)
    }
}

/// A scorer that always fails. Useful for testing the rule-based fallback.
#[derive(Debug)]
pub struct FailingScorer;

#[async_trait]
impl ScoringStrategy for FailingScorer {
    async fn score_solution(
        &self,
        _request: &ScoringRequest,
    ) -> Result<SolutionScores, CoherenceError> {
        Err(CoherenceError::DetectionStrategy {
            strategy: "test-scorer",
            message: "connection refused".to_owned(),
        })
    }
}

/// A scorer that records every request it receives and answers with fixed
/// scores.
#[derive(Debug)]
pub struct RecordingScorer {
    scores: SolutionScores,
    requests: Mutex<Vec<ScoringRequest>>,
}

impl RecordingScorer {
    /// Creates a recording scorer answering with `scores`.
    #[must_use]
    pub fn new(scores: SolutionScores) -> Self {
        Self {
            scores,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all recorded requests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<ScoringRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoringStrategy for RecordingScorer {
    async fn score_solution(
        &self,
        request: &ScoringRequest,
    ) -> Result<SolutionScores, CoherenceError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.scores)
    }
}

/// A scorer that sleeps before answering. Combined with a paused tokio
/// clock, this exercises the scoring-timeout fallback path.
#[derive(Debug, Clone, Copy)]
pub struct SleepScorer {
    /// How long to sleep before answering.
    pub delay: Duration,
    /// The scores returned after the delay.
    pub scores: SolutionScores,
}

#[async_trait]
impl ScoringStrategy for SleepScorer {
    async fn score_solution(
        &self,
        _request: &ScoringRequest,
    ) -> Result<SolutionScores, CoherenceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.scores)
    }
}
