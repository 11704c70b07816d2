//! Note domain model.
//!
//! # Responsibility
//! - Define the note record plus its creation/update inputs.
//! - Own title/content validation, tag normalization and the color palette.
//!
//! # Invariants
//! - Title and content are non-blank once a note exists.
//! - Tags are stored trimmed and deduplicated; ordering is not significant.
//! - `NoteUpdate` distinguishes "field omitted" (`None`) from "field set to a
//!   new value" (`Some`), including `Some(vec![])` clearing all tags.

use crate::model::draft::DraftId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Fixed card color palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteColor {
    #[default]
    Default,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
}

impl NoteColor {
    /// Storage representation of this color.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Pink => "pink",
        }
    }

    /// Parses a storage/transport color value.
    ///
    /// Returns `None` for anything outside the fixed palette; callers must
    /// treat that as a validation failure, never as a fallback to default.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "red" => Some(Self::Red),
            "orange" => Some(Self::Orange),
            "yellow" => Some(Self::Yellow),
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            "purple" => Some(Self::Purple),
            "pink" => Some(Self::Pink),
            _ => None,
        }
    }
}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable note id.
    pub id: NoteId,
    /// Owning account; every query is scoped by this value.
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    /// Normalized tag set (trimmed, deduplicated, sorted).
    pub tags: Vec<String>,
    pub color: NoteColor,
    pub is_pinned: bool,
    pub is_archived: bool,
    /// Last content/flag change in epoch milliseconds.
    pub last_modified: i64,
    /// Creation instant in epoch milliseconds.
    pub created_at: i64,
}

/// Creation input for a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    /// Raw tags; normalized before persistence.
    pub tags: Vec<String>,
    /// Defaults to [`NoteColor::Default`] when absent.
    pub color: Option<NoteColor>,
    /// Draft this note was published from; deleted best-effort on success.
    pub draft_id: Option<DraftId>,
}

/// Partial note update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(vec![])` clears all tags; `None` keeps the current set.
    pub tags: Option<Vec<String>>,
    pub color: Option<NoteColor>,
    pub is_pinned: Option<bool>,
    pub is_archived: Option<bool>,
}

/// Field-level validation failure for note input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title absent or whitespace-only.
    EmptyTitle,
    /// Content absent or whitespace-only.
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::EmptyContent => write!(f, "note content must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Applies a partial update in place, field by field.
    ///
    /// Present fields replace current values; absent fields are untouched.
    /// The caller validates title/content before applying and bumps
    /// `last_modified` afterwards.
    pub fn apply_update(&mut self, update: &NoteUpdate) {
        if let Some(title) = update.title.as_ref() {
            self.title = title.clone();
        }
        if let Some(content) = update.content.as_ref() {
            self.content = content.clone();
        }
        if let Some(tags) = update.tags.as_ref() {
            self.tags = normalize_tags(tags);
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(pinned) = update.is_pinned {
            self.is_pinned = pinned;
        }
        if let Some(archived) = update.is_archived {
            self.is_archived = archived;
        }
    }
}

/// Normalizes one tag value: trimmed, empty values dropped.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalizes and deduplicates a tag list.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}
