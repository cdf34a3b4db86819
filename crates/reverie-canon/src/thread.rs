//! Storyline threads — independently tracked narrative arcs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reverie_core::score::UnitScore;

/// An independently tracked narrative arc.
///
/// Threads are owned by the narrative-direction component. This engine reads
/// them for implicit-contradiction and convergence checks; the only mutation
/// it ever produces is a *suggested* tension adjustment in convergence
/// output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorylineThread {
    /// Thread identifier.
    pub id: Uuid,
    /// Human-readable title.
    pub title: String,
    /// Participants appearing in the arc.
    pub participants: BTreeSet<String>,
    /// Themes the arc develops.
    pub themes: BTreeSet<String>,
    /// Current dramatic tension.
    pub tension: UnitScore,
    /// Where the arc is headed, if declared.
    pub resolution_target: Option<String>,
}

impl StorylineThread {
    /// Creates a thread with no participants or themes yet.
    #[must_use]
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            participants: BTreeSet::new(),
            themes: BTreeSet::new(),
            tension: UnitScore::ZERO,
            resolution_target: None,
        }
    }

    /// Adds a participant, normalized to lowercase.
    pub fn add_participant(&mut self, name: &str) {
        self.participants.insert(name.trim().to_lowercase());
    }

    /// Adds a theme, normalized to lowercase.
    pub fn add_theme(&mut self, theme: &str) {
        self.themes.insert(theme.trim().to_lowercase());
    }
}
