//! The versioned, append-only canon store.
//!
//! One `SessionCanon` per session, modelled as an indexed arena of entry
//! versions. Superseding keeps the old version and links it forward; nothing
//! is destructively overwritten, so a reader never observes a half-written
//! fact. Mutation beyond initial establishment happens only through
//! `apply_change`, driven by the retroactive change manager.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reverie_core::error::CoherenceError;

use crate::content::NarrativeContent;
use crate::lore::{Immutability, LoreEntry, SubjectKey};
use crate::retcon::{ChangeKind, RetroactiveChange};
use crate::thread::StorylineThread;

/// A reinterpreting note attached to a lore entry or content record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// The retroactive change that attached the note.
    pub change_id: Uuid,
    /// The note text.
    pub text: String,
    /// When the note was applied.
    pub applied_at: DateTime<Utc>,
}

/// Outcome of applying one retroactive change.
#[derive(Debug, Clone, Copy)]
pub struct AppliedChange {
    /// The change that was applied.
    pub change_id: Uuid,
    /// Id of the entity the change created (successor or addition), if any.
    pub created_id: Option<Uuid>,
}

/// All canon for a single session.
///
/// Cloning produces an isolated copy; the change manager simulates batches
/// on a clone and swaps it in only when the batch is accepted.
#[derive(Debug, Clone)]
pub struct SessionCanon {
    session_id: Uuid,
    lore: HashMap<Uuid, LoreEntry>,
    lore_by_key: HashMap<SubjectKey, Vec<Uuid>>,
    content: HashMap<Uuid, NarrativeContent>,
    threads: BTreeMap<Uuid, StorylineThread>,
    annotations: HashMap<Uuid, Vec<Annotation>>,
    last_position: u64,
    revision: u64,
}

impl SessionCanon {
    /// Creates an empty canon for a session.
    #[must_use]
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            lore: HashMap::new(),
            lore_by_key: HashMap::new(),
            content: HashMap::new(),
            threads: BTreeMap::new(),
            annotations: HashMap::new(),
            last_position: 0,
            revision: 0,
        }
    }

    /// The session this canon belongs to.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Monotonic counter bumped on every applied change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The highest narrative position recorded so far.
    #[must_use]
    pub fn last_position(&self) -> u64 {
        self.last_position
    }

    // --- establishment (world-building and accepted turns) ---

    /// Establishes a new lore entry.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::InputValidation` for an empty fact or an
    /// empty subject/attribute key.
    pub fn establish_lore(&mut self, mut entry: LoreEntry) -> Result<Uuid, CoherenceError> {
        if entry.fact.trim().is_empty() {
            return Err(CoherenceError::InputValidation(
                "lore fact must not be empty".to_owned(),
            ));
        }
        if entry.key.subject.is_empty() || entry.key.attribute.is_empty() {
            return Err(CoherenceError::InputValidation(
                "lore subject and attribute must not be empty".to_owned(),
            ));
        }
        entry.version = 1;
        entry.superseded_by = None;
        let id = entry.id;
        self.lore_by_key.entry(entry.key.clone()).or_default().push(id);
        self.lore.insert(id, entry);
        Ok(id)
    }

    /// Records an accepted content item.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::InputValidation` for empty text or a
    /// position that does not advance the session's narrative position.
    pub fn record_content(&mut self, content: NarrativeContent) -> Result<Uuid, CoherenceError> {
        if content.text.trim().is_empty() {
            return Err(CoherenceError::InputValidation(
                "content text must not be empty".to_owned(),
            ));
        }
        if content.position <= self.last_position {
            return Err(CoherenceError::InputValidation(format!(
                "content position {} does not advance past {}",
                content.position, self.last_position
            )));
        }
        let id = content.id;
        self.last_position = self.last_position.max(content.position);
        self.content.insert(id, content);
        Ok(id)
    }

    /// Inserts or replaces a storyline thread.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::InputValidation` for an empty title.
    pub fn upsert_thread(&mut self, thread: StorylineThread) -> Result<(), CoherenceError> {
        if thread.title.trim().is_empty() {
            return Err(CoherenceError::InputValidation(
                "thread title must not be empty".to_owned(),
            ));
        }
        self.threads.insert(thread.id, thread);
        Ok(())
    }

    // --- queries ---

    /// Looks up any lore version by id.
    #[must_use]
    pub fn lore(&self, id: Uuid) -> Option<&LoreEntry> {
        self.lore.get(&id)
    }

    /// Looks up any content version by id.
    #[must_use]
    pub fn content(&self, id: Uuid) -> Option<&NarrativeContent> {
        self.content.get(&id)
    }

    /// Looks up a storyline thread by id.
    #[must_use]
    pub fn thread(&self, id: Uuid) -> Option<&StorylineThread> {
        self.threads.get(&id)
    }

    /// Current (non-superseded) lore entries sharing a subject+attribute key.
    #[must_use]
    pub fn lore_heads_for(&self, key: &SubjectKey) -> Vec<&LoreEntry> {
        self.lore_by_key.get(key).map_or_else(Vec::new, |ids| {
            ids.iter()
                .filter_map(|id| self.lore.get(id))
                .filter(|entry| entry.is_head())
                .collect()
        })
    }

    /// Iterates over all storyline threads in stable id order.
    pub fn threads(&self) -> impl Iterator<Item = &StorylineThread> {
        self.threads.values()
    }

    /// Notes attached to an entry or record by retroactive annotation.
    #[must_use]
    pub fn annotations_for(&self, id: Uuid) -> &[Annotation] {
        self.annotations.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Resolves the narrative position of a referenced element: the position
    /// of a content record, or the established-at position of a lore entry.
    #[must_use]
    pub fn position_of(&self, id: Uuid) -> Option<u64> {
        if let Some(content) = self.content.get(&id) {
            return Some(content.position);
        }
        self.lore.get(&id).map(|entry| entry.established_at)
    }

    /// Human-readable text of a referenced element, if it exists.
    #[must_use]
    pub fn text_of(&self, id: Uuid) -> Option<&str> {
        if let Some(content) = self.content.get(&id) {
            return Some(&content.text);
        }
        self.lore.get(&id).map(|entry| entry.fact.as_str())
    }

    // --- retroactive mutation (change-manager entry point) ---

    /// Applies a single retroactive change.
    ///
    /// Called by the retroactive change manager, normally against a clone
    /// that is swapped in only when the whole batch is accepted.
    ///
    /// # Errors
    ///
    /// - `RetroactiveChangeConflict` when the target does not exist, is
    ///   already superseded, or is hard canon being modified.
    /// - `Transaction` when the change's original-content snapshot no longer
    ///   matches the live target (stale draft).
    pub fn apply_change(
        &mut self,
        change: &RetroactiveChange,
        applied_at: DateTime<Utc>,
    ) -> Result<AppliedChange, CoherenceError> {
        let applied = match change.kind {
            ChangeKind::Modification => self.apply_modification(change, applied_at)?,
            ChangeKind::Addition => self.apply_addition(change, applied_at)?,
            ChangeKind::Annotation => self.apply_annotation(change, applied_at)?,
        };
        self.revision += 1;
        Ok(applied)
    }

    fn apply_modification(
        &mut self,
        change: &RetroactiveChange,
        applied_at: DateTime<Utc>,
    ) -> Result<AppliedChange, CoherenceError> {
        if let Some(target) = self.lore.get(&change.target_id).cloned() {
            if !target.is_head() {
                return Err(CoherenceError::RetroactiveChangeConflict {
                    change_id: change.id,
                    message: format!("lore entry {} is already superseded", target.id),
                });
            }
            if target.immutability == Immutability::HardCanon {
                return Err(CoherenceError::RetroactiveChangeConflict {
                    change_id: change.id,
                    message: format!("lore entry {} is hard canon", target.id),
                });
            }
            if target.fact != change.original_content {
                return Err(CoherenceError::Transaction(format!(
                    "stale snapshot for lore entry {}",
                    target.id
                )));
            }
            let successor = LoreEntry {
                id: Uuid::new_v4(),
                category: target.category,
                fact: change.modified_content.clone(),
                key: target.key.clone(),
                established_at: target.established_at,
                immutability: target.immutability,
                version: target.version + 1,
                superseded_by: None,
                created_at: applied_at,
            };
            let successor_id = successor.id;
            self.lore_by_key
                .entry(successor.key.clone())
                .or_default()
                .push(successor_id);
            self.lore.insert(successor_id, successor);
            if let Some(old) = self.lore.get_mut(&change.target_id) {
                old.superseded_by = Some(successor_id);
            }
            return Ok(AppliedChange {
                change_id: change.id,
                created_id: Some(successor_id),
            });
        }

        if let Some(target) = self.content.get(&change.target_id).cloned() {
            if target.superseded_by.is_some() {
                return Err(CoherenceError::RetroactiveChangeConflict {
                    change_id: change.id,
                    message: format!("content {} is already superseded", target.id),
                });
            }
            if target.text != change.original_content {
                return Err(CoherenceError::Transaction(format!(
                    "stale snapshot for content {}",
                    target.id
                )));
            }
            let successor = NarrativeContent {
                id: Uuid::new_v4(),
                text: change.modified_content.clone(),
                version: target.version + 1,
                superseded_by: None,
                created_at: applied_at,
                ..target
            };
            let successor_id = successor.id;
            self.content.insert(successor_id, successor);
            if let Some(old) = self.content.get_mut(&change.target_id) {
                old.superseded_by = Some(successor_id);
            }
            return Ok(AppliedChange {
                change_id: change.id,
                created_id: Some(successor_id),
            });
        }

        Err(CoherenceError::RetroactiveChangeConflict {
            change_id: change.id,
            message: format!("target {} not found in canon", change.target_id),
        })
    }

    fn apply_addition(
        &mut self,
        change: &RetroactiveChange,
        applied_at: DateTime<Utc>,
    ) -> Result<AppliedChange, CoherenceError> {
        if let Some(target) = self.lore.get(&change.target_id).cloned() {
            let addition = LoreEntry {
                id: Uuid::new_v4(),
                category: target.category,
                fact: change.modified_content.clone(),
                key: target.key.clone(),
                established_at: target.established_at,
                immutability: Immutability::Soft,
                version: 1,
                superseded_by: None,
                created_at: applied_at,
            };
            let id = addition.id;
            self.lore_by_key.entry(addition.key.clone()).or_default().push(id);
            self.lore.insert(id, addition);
            return Ok(AppliedChange {
                change_id: change.id,
                created_id: Some(id),
            });
        }

        if let Some(target) = self.content.get(&change.target_id).cloned() {
            let position = self.last_position + 1;
            let mut addition =
                NarrativeContent::new(target.session_id, change.modified_content.clone(), position, applied_at);
            addition.causal_links.push(target.id);
            let id = addition.id;
            self.last_position = position;
            self.content.insert(id, addition);
            return Ok(AppliedChange {
                change_id: change.id,
                created_id: Some(id),
            });
        }

        Err(CoherenceError::RetroactiveChangeConflict {
            change_id: change.id,
            message: format!("target {} not found in canon", change.target_id),
        })
    }

    fn apply_annotation(
        &mut self,
        change: &RetroactiveChange,
        applied_at: DateTime<Utc>,
    ) -> Result<AppliedChange, CoherenceError> {
        if !self.lore.contains_key(&change.target_id) && !self.content.contains_key(&change.target_id)
        {
            return Err(CoherenceError::RetroactiveChangeConflict {
                change_id: change.id,
                message: format!("target {} not found in canon", change.target_id),
            });
        }
        self.annotations
            .entry(change.target_id)
            .or_default()
            .push(Annotation {
                change_id: change.id,
                text: change.modified_content.clone(),
                applied_at,
            });
        Ok(AppliedChange {
            change_id: change.id,
            created_id: None,
        })
    }
}

/// Shared handle to every session's canon.
///
/// Reads may run concurrently across and within sessions; the change manager
/// serializes writes by holding a session's write guard across its whole
/// validate-and-apply pipeline.
#[derive(Debug, Default)]
pub struct CanonStore {
    sessions: RwLock<HashMap<Uuid, Arc<tokio::sync::RwLock<SessionCanon>>>>,
}

impl CanonStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canon handle for a session, creating it on first use.
    ///
    /// # Panics
    ///
    /// Panics if the session map lock is poisoned.
    #[must_use]
    pub fn session(&self, session_id: Uuid) -> Arc<tokio::sync::RwLock<SessionCanon>> {
        if let Some(existing) = self
            .sessions
            .read()
            .expect("canon session map poisoned")
            .get(&session_id)
        {
            return Arc::clone(existing);
        }
        let mut sessions = self.sessions.write().expect("canon session map poisoned");
        Arc::clone(
            sessions
                .entry(session_id)
                .or_insert_with(|| Arc::new(tokio::sync::RwLock::new(SessionCanon::new(session_id)))),
        )
    }
}
