//! Engine error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the coherence engine.
///
/// Detection-strategy failures are recovered locally into warning-level
/// consistency issues; resolution and commit failures are surfaced in the
/// returned `NarrativeResolution`/`CommitResult` values. Variants of this
/// enum only propagate where the caller handed the engine something it
/// cannot work with at all.
#[derive(Debug, Error)]
pub enum CoherenceError {
    /// A malformed entity was rejected before detection ran.
    #[error("input validation error: {0}")]
    InputValidation(String),

    /// A single detection strategy failed internally.
    #[error("detection strategy '{strategy}' failed: {message}")]
    DetectionStrategy {
        /// Name of the strategy that failed.
        strategy: &'static str,
        /// What went wrong.
        message: String,
    },

    /// No candidate solution cleared the acceptance bar.
    #[error("resolution rejected: {0}")]
    ResolutionRejected(String),

    /// A retroactive change batch would introduce a contradiction at least
    /// as severe as the one being resolved.
    #[error("retroactive change {change_id} conflicts with canon: {message}")]
    RetroactiveChangeConflict {
        /// The offending change.
        change_id: Uuid,
        /// Why the batch was rejected.
        message: String,
    },

    /// A change batch could not be applied; canon was left unchanged.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
