//! Draft repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the find-or-create reconciliation of one draft per
//!   `(user_id, note_id)` key.
//! - Serialize the optional tag list through the JSON `tags` column.
//!
//! # Invariants
//! - The unique index `drafts_owner_note_key` backs every write; a
//!   violated insert surfaces as `RepoError::Conflict` so callers can
//!   re-fetch and update instead.
//! - An absent `note_id` addresses the single "new note" draft.

use crate::model::draft::{Draft, DraftId, DraftPatch};
use crate::model::note::{NoteColor, NoteId};
use crate::model::user::UserId;
use crate::repo::{is_unique_violation, now_epoch_ms, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const DRAFT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    note_id,
    title,
    content,
    tags,
    color,
    last_saved
FROM drafts";

/// Repository interface for draft persistence.
pub trait DraftRepository {
    /// Merges a patch into the draft for `(user_id, note_id)`, creating it
    /// when absent. Returns the stored draft.
    ///
    /// A concurrent create racing past the initial lookup is rejected by
    /// the unique index and surfaces as `Conflict`; callers retry once.
    fn upsert_draft(
        &self,
        user_id: UserId,
        note_id: Option<NoteId>,
        patch: &DraftPatch,
    ) -> RepoResult<Draft>;
    /// Gets the draft for `(user_id, note_id)`, if any.
    fn get_draft(&self, user_id: UserId, note_id: Option<NoteId>) -> RepoResult<Option<Draft>>;
    /// Deletes one draft by id. Returns whether a row was removed.
    fn delete_draft(&self, user_id: UserId, draft_id: DraftId) -> RepoResult<bool>;
    /// Deletes the draft shadowing one note. Returns whether a row was
    /// removed. Used by note update/delete cascades.
    fn delete_draft_for_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<bool>;
}

/// SQLite-backed draft repository.
pub struct SqliteDraftRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDraftRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DraftRepository for SqliteDraftRepository<'_> {
    fn upsert_draft(
        &self,
        user_id: UserId,
        note_id: Option<NoteId>,
        patch: &DraftPatch,
    ) -> RepoResult<Draft> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = find_by_key(&tx, user_id, note_id)?;
        let now = now_epoch_ms();

        let draft = match existing {
            Some(mut draft) => {
                draft.apply_patch(patch);
                draft.last_saved = now;
                let changed = tx.execute(
                    "UPDATE drafts
                     SET
                        title = ?2,
                        content = ?3,
                        tags = ?4,
                        color = ?5,
                        last_saved = ?6
                     WHERE id = ?1;",
                    params![
                        draft.id.to_string(),
                        draft.title.as_deref(),
                        draft.content.as_deref(),
                        tags_to_json(draft.tags.as_deref())?,
                        draft.color.map(NoteColor::as_str),
                        draft.last_saved,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(draft.id));
                }
                draft
            }
            None => {
                let draft = Draft {
                    id: Uuid::new_v4(),
                    user_id,
                    note_id,
                    title: patch.title.clone(),
                    content: patch.content.clone(),
                    tags: patch.tags.clone(),
                    color: patch.color,
                    last_saved: now,
                };
                let inserted = tx.execute(
                    "INSERT INTO drafts (
                        id,
                        user_id,
                        note_id,
                        title,
                        content,
                        tags,
                        color,
                        last_saved
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                    params![
                        draft.id.to_string(),
                        draft.user_id.to_string(),
                        draft.note_id.map(|id| id.to_string()),
                        draft.title.as_deref(),
                        draft.content.as_deref(),
                        tags_to_json(draft.tags.as_deref())?,
                        draft.color.map(NoteColor::as_str),
                        draft.last_saved,
                    ],
                );
                match inserted {
                    Ok(_) => draft,
                    Err(err) if is_unique_violation(&err) => {
                        return Err(RepoError::Conflict("drafts_owner_note_key"));
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        tx.commit()?;
        Ok(draft)
    }

    fn get_draft(&self, user_id: UserId, note_id: Option<NoteId>) -> RepoResult<Option<Draft>> {
        find_by_key(self.conn, user_id, note_id)
    }

    fn delete_draft(&self, user_id: UserId, draft_id: DraftId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM drafts WHERE id = ?1 AND user_id = ?2;",
            params![draft_id.to_string(), user_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn delete_draft_for_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM drafts WHERE user_id = ?1 AND note_id = ?2;",
            params![user_id.to_string(), note_id.to_string()],
        )?;
        Ok(changed > 0)
    }
}

fn find_by_key(
    conn: &Connection,
    user_id: UserId,
    note_id: Option<NoteId>,
) -> RepoResult<Option<Draft>> {
    let mut stmt = conn.prepare(&format!(
        "{DRAFT_SELECT_SQL}
         WHERE user_id = ?1
           AND COALESCE(note_id, '') = COALESCE(?2, '');"
    ))?;
    let mut rows = stmt.query(params![
        user_id.to_string(),
        note_id.map(|id| id.to_string())
    ])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_draft_row(row)?));
    }
    Ok(None)
}

fn parse_draft_row(row: &Row<'_>) -> RepoResult<Draft> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "drafts.id")?;

    let user_id_text: String = row.get("user_id")?;
    let user_id = parse_uuid(&user_id_text, "drafts.user_id")?;

    let note_id = match row.get::<_, Option<String>>("note_id")? {
        Some(value) => Some(parse_uuid(&value, "drafts.note_id")?),
        None => None,
    };

    let color = match row.get::<_, Option<String>>("color")? {
        Some(value) => Some(NoteColor::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid color `{value}` in drafts.color"))
        })?),
        None => None,
    };

    Ok(Draft {
        id,
        user_id,
        note_id,
        title: row.get("title")?,
        content: row.get("content")?,
        tags: tags_from_json(row.get::<_, Option<String>>("tags")?)?,
        color,
        last_saved: row.get("last_saved")?,
    })
}

fn tags_to_json(tags: Option<&[String]>) -> RepoResult<Option<String>> {
    match tags {
        Some(values) => serde_json::to_string(values)
            .map(Some)
            .map_err(|err| RepoError::InvalidData(format!("unserializable tag list: {err}"))),
        None => Ok(None),
    }
}

fn tags_from_json(raw: Option<String>) -> RepoResult<Option<Vec<String>>> {
    match raw {
        Some(text) => serde_json::from_str(&text).map(Some).map_err(|err| {
            RepoError::InvalidData(format!("invalid tag list `{text}` in drafts.tags: {err}"))
        }),
        None => Ok(None),
    }
}
