//! Core domain logic for Notewell.
//! This crate is the single source of truth for business invariants:
//! account registration, note lifecycle, draft reconciliation and tag
//! queries, all scoped to an already-authenticated owner.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{Draft, DraftId, DraftPatch};
pub use model::note::{NewNote, Note, NoteColor, NoteId, NoteUpdate, NoteValidationError};
pub use model::user::{NewUser, ProfileUpdate, User, UserId, UserRole, UserValidationError};
pub use repo::draft_repo::{DraftRepository, SqliteDraftRepository};
pub use repo::note_repo::{NoteListQuery, NoteRepository, SqliteNoteRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountError, AccountService};
pub use service::draft_service::{DraftService, DraftServiceError};
pub use service::note_service::{NoteService, NoteServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
