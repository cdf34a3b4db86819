//! Shared application state.

use std::sync::Arc;

use reverie_canon::CanonStore;
use reverie_coherence::CoherenceValidator;
use reverie_core::clock::Clock;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The coherence engine façade.
    pub validator: Arc<CoherenceValidator>,
    /// The canon store (same instance the validator reads).
    pub canon: Arc<CanonStore>,
    /// Clock for entity timestamps.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(validator: Arc<CoherenceValidator>, clock: Arc<dyn Clock>) -> Self {
        let canon = validator.canon();
        Self {
            validator,
            canon,
            clock,
        }
    }
}
