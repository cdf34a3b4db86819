//! Convergence analysis results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reverie_core::score::UnitScore;

/// Result of analyzing a session's storyline threads for shared direction.
/// Ephemeral; recomputed per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceValidation {
    /// The analyzed session.
    pub session_id: Uuid,
    /// How many threads were analyzed.
    pub storyline_count: usize,
    /// Whether the threads are converging toward a shared resolution.
    pub is_convergent: bool,
    /// Convergence score.
    pub score: UnitScore,
    /// One descriptive entry per shared participant and per shared theme.
    pub convergence_points: Vec<String>,
    /// Threads with no overlap with any other thread.
    pub integration_issues: Vec<String>,
    /// Concrete suggestions for bringing the threads together.
    pub recommended_adjustments: Vec<String>,
}
