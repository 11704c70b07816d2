//! Draft reconciliation service.
//!
//! # Responsibility
//! - Maintain at most one autosaved draft per `(user, note-or-new)` key.
//! - Merge autosave patches into the existing draft, or create one.
//!
//! # Invariants
//! - A save racing another save for the same key never creates a second
//!   row: the storage unique index rejects the loser, which then retries
//!   once by merging into the winner's row.
//! - Publishing is not a stored state; a published draft is simply
//!   deleted by the note lifecycle cascade.

use crate::model::draft::{Draft, DraftId, DraftPatch};
use crate::model::note::NoteId;
use crate::model::user::UserId;
use crate::repo::draft_repo::DraftRepository;
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for draft use-cases.
#[derive(Debug)]
pub enum DraftServiceError {
    /// No draft exists for the requested `(user, note-or-new)` key.
    NoDraftForKey { note_id: Option<NoteId> },
    /// No draft with this id is owned by the caller.
    DraftNotFound(DraftId),
    /// The autosave targets a note the caller does not own.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for DraftServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDraftForKey { note_id: Some(id) } => {
                write!(f, "no draft found for note {id}")
            }
            Self::NoDraftForKey { note_id: None } => write!(f, "no new-note draft found"),
            Self::DraftNotFound(id) => write!(f, "draft not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DraftServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DraftServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Draft service facade over draft and note repositories.
///
/// The note repository is only consulted to verify that an autosave
/// targeting an existing note addresses one the caller owns.
pub struct DraftService<D: DraftRepository, N: NoteRepository> {
    drafts: D,
    notes: N,
}

impl<D: DraftRepository, N: NoteRepository> DraftService<D, N> {
    /// Creates a service using the provided repository implementations.
    pub fn new(drafts: D, notes: N) -> Self {
        Self { drafts, notes }
    }

    /// Autosaves a draft for `(user_id, note_id)`.
    ///
    /// # Contract
    /// - An existing draft for the key is merged in place; present patch
    ///   fields replace current values, absent fields survive.
    /// - With no existing draft, a new one is created from the patch.
    /// - `last_saved` is bumped on every save.
    /// - A concrete `note_id` must address a note owned by the caller.
    pub fn save_draft(
        &self,
        user_id: UserId,
        note_id: Option<NoteId>,
        patch: &DraftPatch,
    ) -> Result<Draft, DraftServiceError> {
        if let Some(target) = note_id {
            if self.notes.get_note(user_id, target)?.is_none() {
                return Err(DraftServiceError::NoteNotFound(target));
            }
        }

        match self.drafts.upsert_draft(user_id, note_id, patch) {
            Ok(draft) => Ok(draft),
            Err(RepoError::Conflict(constraint)) => {
                // Lost the insert race; the row now exists, so a second
                // pass takes the merge path.
                warn!(
                    "event=draft_save_retry module=service status=retry user_id={user_id} constraint={constraint}"
                );
                Ok(self.drafts.upsert_draft(user_id, note_id, patch)?)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Gets the draft for `(user_id, note_id)`; `None` addresses the
    /// new-note draft.
    pub fn get_draft(
        &self,
        user_id: UserId,
        note_id: Option<NoteId>,
    ) -> Result<Draft, DraftServiceError> {
        self.drafts
            .get_draft(user_id, note_id)?
            .ok_or(DraftServiceError::NoDraftForKey { note_id })
    }

    /// Discards one draft by id.
    pub fn delete_draft(
        &self,
        user_id: UserId,
        draft_id: DraftId,
    ) -> Result<(), DraftServiceError> {
        if !self.drafts.delete_draft(user_id, draft_id)? {
            return Err(DraftServiceError::DraftNotFound(draft_id));
        }
        Ok(())
    }
}
