//! Draft domain model.
//!
//! # Responsibility
//! - Define the autosaved shadow record of a note (or of a note that does
//!   not exist yet).
//! - Define the patch shape merged into a draft on every autosave.
//!
//! # Invariants
//! - At most one draft exists per `(user_id, note_id)` key, where an absent
//!   `note_id` is the "new note" pseudo-key.
//! - Every field except identity and `last_saved` is optional; a draft may
//!   be arbitrarily partial.

use crate::model::note::{NoteColor, NoteId};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a draft.
pub type DraftId = Uuid;

/// Persisted autosave record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Stable draft id.
    pub id: DraftId,
    /// Owning account.
    pub user_id: UserId,
    /// Target note, or `None` for the single "new note" draft.
    pub note_id: Option<NoteId>,
    pub title: Option<String>,
    pub content: Option<String>,
    /// Raw tag list as last autosaved; normalized only at publish time.
    pub tags: Option<Vec<String>>,
    pub color: Option<NoteColor>,
    /// Last autosave instant in epoch milliseconds.
    pub last_saved: i64,
}

/// Autosave payload. Present fields replace the draft's current values;
/// absent fields are left untouched, so successive autosaves merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub color: Option<NoteColor>,
}

impl Draft {
    /// Merges an autosave patch into this draft, field by field.
    pub fn apply_patch(&mut self, patch: &DraftPatch) {
        if let Some(title) = patch.title.as_ref() {
            self.title = Some(title.clone());
        }
        if let Some(content) = patch.content.as_ref() {
            self.content = Some(content.clone());
        }
        if let Some(tags) = patch.tags.as_ref() {
            self.tags = Some(tags.clone());
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
    }
}
