//! Reverie — narrative coherence and conflict resolution engine.
//!
//! Detects when newly generated narrative content contradicts established
//! canon or active storylines, synthesizes in-fiction ways to reconcile the
//! contradiction, applies retroactive changes transactionally, and judges
//! whether concurrent storylines are converging.
//!
//! External collaborators depend on [`CoherenceValidator`] only; the
//! components behind it are not part of the public contract.

pub mod config;
pub mod convergence;
pub mod detection;
pub mod domain;
pub mod retcon;
pub mod scoring;
pub mod solutions;
pub mod validator;

pub use config::CoherenceConfig;
pub use convergence::StorylineConvergenceValidator;
pub use detection::{CausalValidator, ContradictionDetector, DetectionOutcome};
pub use domain::contradiction::{
    ConflictingElement, ConsistencyIssue, Contradiction, ContradictionKind, Severity,
};
pub use domain::convergence::ConvergenceValidation;
pub use domain::resolution::NarrativeResolution;
pub use domain::solution::{CreativeSolution, SolutionType};
pub use retcon::{CommitResult, RetroactiveChangeManager};
pub use scoring::RuleBasedScorer;
pub use solutions::{CreativeSolutionGenerator, SolutionSelector};
pub use validator::{CoherenceValidator, ValidationResult};
