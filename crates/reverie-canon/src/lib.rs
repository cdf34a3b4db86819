//! Reverie — canon store.
//!
//! Holds the entities the platform treats as narrative ground truth:
//! established lore, accepted narrative content, and storyline threads.
//! Canon is append-only; history is rewritten only through retroactive
//! changes that supersede old versions, never overwrite them.

pub mod audit;
pub mod content;
pub mod lore;
pub mod retcon;
pub mod store;
pub mod thread;

pub use audit::{AuditLog, AuditRecord};
pub use content::{Assertion, NarrativeContent, OrderingClaim};
pub use lore::{Immutability, LoreCategory, LoreEntry, SubjectKey};
pub use retcon::{ChangeKind, RetroactiveChange};
pub use store::{Annotation, AppliedChange, CanonStore, SessionCanon};
pub use thread::StorylineThread;
