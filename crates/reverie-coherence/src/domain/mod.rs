//! Domain types for the coherence engine.
//!
//! These results are ephemeral: contradictions are recomputed per detection
//! pass and resolutions are handed back to the caller, never stored as
//! canon themselves.

pub mod contradiction;
pub mod convergence;
pub mod resolution;
pub mod solution;
