//! Canon fixtures — canned entities for Arrange blocks.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use reverie_canon::{
    Immutability, LoreCategory, LoreEntry, NarrativeContent, StorylineThread, SubjectKey,
};
use reverie_core::score::UnitScore;

fn fixture_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A soft character fact established at position 1.
#[must_use]
pub fn soft_lore(subject: &str, attribute: &str, fact: &str) -> LoreEntry {
    LoreEntry::new(
        LoreCategory::Character,
        fact,
        SubjectKey::new(subject, attribute),
        1,
        Immutability::Soft,
        fixture_time(),
    )
}

/// A hard-canon fact established at position 1.
#[must_use]
pub fn hard_lore(subject: &str, attribute: &str, fact: &str) -> LoreEntry {
    LoreEntry::new(
        LoreCategory::Rule,
        fact,
        SubjectKey::new(subject, attribute),
        1,
        Immutability::HardCanon,
        fixture_time(),
    )
}

/// A bare content record at the given position.
#[must_use]
pub fn content_at(session_id: Uuid, text: &str, position: u64) -> NarrativeContent {
    NarrativeContent::new(session_id, text, position, fixture_time())
}

/// A thread with the given participants and themes, at mid tension.
#[must_use]
pub fn thread_with(title: &str, participants: &[&str], themes: &[&str]) -> StorylineThread {
    let mut thread = StorylineThread::new(Uuid::new_v4(), title);
    for participant in participants {
        thread.add_participant(participant);
    }
    for theme in themes {
        thread.add_theme(theme);
    }
    thread.tension = UnitScore::new(0.5);
    thread
}
