//! Note lifecycle service.
//!
//! # Responsibility
//! - Enforce note field invariants on create/update.
//! - Own flag toggles, listing/filtering and the derived tag set.
//! - Trigger draft cleanup when a note is published, updated or deleted.
//!
//! # Invariants
//! - Title and content are validated non-blank before every write.
//! - Partial updates apply only present fields; `Some(vec![])` clears tags
//!   while `None` leaves them untouched.
//! - Every content or flag mutation bumps `last_modified`.
//! - Draft cleanup is best-effort: a failure is logged and the primary
//!   operation still succeeds.

use crate::model::draft::DraftId;
use crate::model::note::{
    normalize_tag, normalize_tags, NewNote, Note, NoteId, NoteUpdate, NoteValidationError,
};
use crate::model::user::UserId;
use crate::repo::draft_repo::DraftRepository;
use crate::repo::note_repo::{NoteListQuery, NoteRepository};
use crate::repo::{now_epoch_ms, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Input failed field validation.
    Validation(NoteValidationError),
    /// Target note does not exist for this owner.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NoteNotFound(_) => None,
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Note service facade over note and draft repositories.
///
/// The draft repository is only touched for cleanup cascades; draft
/// reconciliation itself lives in
/// [`DraftService`](crate::service::draft_service::DraftService).
pub struct NoteService<N: NoteRepository, D: DraftRepository> {
    notes: N,
    drafts: D,
}

impl<N: NoteRepository, D: DraftRepository> NoteService<N, D> {
    /// Creates a service using the provided repository implementations.
    pub fn new(notes: N, drafts: D) -> Self {
        Self { notes, drafts }
    }

    /// Creates one note.
    ///
    /// # Contract
    /// - Blank title or content fails validation.
    /// - Color defaults to `default`, tags to the empty set.
    /// - New notes start unpinned and unarchived.
    /// - When `draft_id` is present the published draft is deleted
    ///   best-effort.
    pub fn create_note(
        &self,
        user_id: UserId,
        new_note: &NewNote,
    ) -> Result<Note, NoteServiceError> {
        validate_title(&new_note.title)?;
        validate_content(&new_note.content)?;

        let now = now_epoch_ms();
        let note = Note {
            id: Uuid::new_v4(),
            user_id,
            title: new_note.title.clone(),
            content: new_note.content.clone(),
            tags: normalize_tags(&new_note.tags),
            color: new_note.color.unwrap_or_default(),
            is_pinned: false,
            is_archived: false,
            last_modified: now,
            created_at: now,
        };

        self.notes.insert_note(&note)?;
        info!(
            "event=note_created module=service status=ok user_id={user_id} note_id={}",
            note.id
        );

        if let Some(draft_id) = new_note.draft_id {
            self.cleanup_published_draft(user_id, draft_id);
        }

        Ok(note)
    }

    /// Gets one note by id, scoped to its owner.
    pub fn get_note(&self, user_id: UserId, note_id: NoteId) -> Result<Note, NoteServiceError> {
        self.notes
            .get_note(user_id, note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))
    }

    /// Applies a partial update, bumps `last_modified` and drops the draft
    /// shadowing this note.
    pub fn update_note(
        &self,
        user_id: UserId,
        note_id: NoteId,
        update: &NoteUpdate,
    ) -> Result<Note, NoteServiceError> {
        if let Some(title) = update.title.as_ref() {
            validate_title(title)?;
        }
        if let Some(content) = update.content.as_ref() {
            validate_content(content)?;
        }

        let mut note = self
            .notes
            .get_note(user_id, note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))?;

        note.apply_update(update);
        note.last_modified = now_epoch_ms();
        self.notes.update_note(&note)?;

        self.cleanup_note_draft(user_id, note_id);
        Ok(note)
    }

    /// Deletes one note and cascades deletion of its shadow draft.
    pub fn delete_note(&self, user_id: UserId, note_id: NoteId) -> Result<(), NoteServiceError> {
        self.notes.delete_note(user_id, note_id)?;
        info!(
            "event=note_deleted module=service status=ok user_id={user_id} note_id={note_id}"
        );

        self.cleanup_note_draft(user_id, note_id);
        Ok(())
    }

    /// Flips the pin flag and returns the new value.
    ///
    /// Flip (rather than set) semantics are the intended contract; a
    /// retried toggle after an ambiguous failure flips twice.
    pub fn toggle_pin(&self, user_id: UserId, note_id: NoteId) -> Result<bool, NoteServiceError> {
        let mut note = self
            .notes
            .get_note(user_id, note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))?;

        note.is_pinned = !note.is_pinned;
        note.last_modified = now_epoch_ms();
        self.notes.update_note(&note)?;
        Ok(note.is_pinned)
    }

    /// Flips the archive flag and returns the new value.
    pub fn toggle_archive(
        &self,
        user_id: UserId,
        note_id: NoteId,
    ) -> Result<bool, NoteServiceError> {
        let mut note = self
            .notes
            .get_note(user_id, note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))?;

        note.is_archived = !note.is_archived;
        note.last_modified = now_epoch_ms();
        self.notes.update_note(&note)?;
        Ok(note.is_archived)
    }

    /// Lists notes with archive/tag/search filters applied.
    ///
    /// Results are ordered pinned-first, then most recently modified.
    pub fn list_notes(
        &self,
        user_id: UserId,
        query: &NoteListQuery,
    ) -> Result<Vec<Note>, NoteServiceError> {
        let normalized = NoteListQuery {
            tag: query
                .tag
                .as_ref()
                .and_then(|value| normalize_tag(value.as_str())),
            ..query.clone()
        };
        Ok(self.notes.list_notes(user_id, &normalized)?)
    }

    /// Returns the distinct tags in use across the owner's notes.
    ///
    /// Recomputed per call; cost is linear in the note count.
    pub fn list_tags(&self, user_id: UserId) -> Result<Vec<String>, NoteServiceError> {
        Ok(self.notes.list_tags(user_id)?)
    }

    fn cleanup_published_draft(&self, user_id: UserId, draft_id: DraftId) {
        if let Err(err) = self.drafts.delete_draft(user_id, draft_id) {
            error!(
                "event=draft_cleanup module=service status=error user_id={user_id} draft_id={draft_id} error={err}"
            );
        }
    }

    fn cleanup_note_draft(&self, user_id: UserId, note_id: NoteId) {
        if let Err(err) = self.drafts.delete_draft_for_note(user_id, note_id) {
            error!(
                "event=draft_cleanup module=service status=error user_id={user_id} note_id={note_id} error={err}"
            );
        }
    }
}

fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), NoteValidationError> {
    if content.trim().is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}
