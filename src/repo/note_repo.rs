//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist note rows, their tag links and the full-text shadow table.
//! - Keep all three in sync inside one transaction per write.
//!
//! # Invariants
//! - Every query is constrained to the owning `user_id`.
//! - `notes_fts` mirrors title/content/tags for exactly the live note rows.
//! - List ordering is `is_pinned DESC, last_modified DESC, id ASC`.

use crate::model::note::{Note, NoteColor, NoteId};
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    content,
    color,
    is_pinned,
    is_archived,
    last_modified,
    created_at
FROM notes";

/// Filter options for the note list use-case.
///
/// The default excludes archived notes; `archived` restricts to archived
/// only; `all` overrides both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Return archived notes instead of active ones.
    pub archived: bool,
    /// Return every note regardless of archive state.
    pub all: bool,
    /// Exact-match filter against the note's tag set.
    pub tag: Option<String>,
    /// Free-text match over title/content/tags.
    pub search: Option<String>,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts one note row with its tag links and full-text entry.
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Gets one note by id, scoped to its owner.
    fn get_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Replaces the full note row, tag links and full-text entry.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    /// Hard-deletes one note and its dependent rows.
    fn delete_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<()>;
    /// Lists notes for one owner using archive/tag/search filters.
    fn list_notes(&self, user_id: UserId, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Returns the distinct tags currently in use across the owner's notes.
    fn list_tags(&self, user_id: UserId) -> RepoResult<Vec<String>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO notes (
                id,
                user_id,
                title,
                content,
                color,
                is_pinned,
                is_archived,
                last_modified,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                note.id.to_string(),
                note.user_id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.color.as_str(),
                bool_to_int(note.is_pinned),
                bool_to_int(note.is_archived),
                note.last_modified,
                note.created_at,
            ],
        )?;

        write_tag_links(&tx, note)?;
        write_fts_row(&tx, note)?;

        tx.commit()?;
        Ok(note.id)
    }

    fn get_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE id = ?1 AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![note_id.to_string(), user_id.to_string()])?;
        if let Some(row) = rows.next()? {
            let note = parse_note_row(self.conn, row)?;
            return Ok(Some(note));
        }
        Ok(None)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?3,
                content = ?4,
                color = ?5,
                is_pinned = ?6,
                is_archived = ?7,
                last_modified = ?8
             WHERE id = ?1
               AND user_id = ?2;",
            params![
                note.id.to_string(),
                note.user_id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.color.as_str(),
                bool_to_int(note.is_pinned),
                bool_to_int(note.is_archived),
                note.last_modified,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }

        tx.execute(
            "DELETE FROM note_tags WHERE note_id = ?1;",
            [note.id.to_string()],
        )?;
        write_tag_links(&tx, note)?;

        tx.execute(
            "DELETE FROM notes_fts WHERE note_id = ?1;",
            [note.id.to_string()],
        )?;
        write_fts_row(&tx, note)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        // note_tags rows go with the note via ON DELETE CASCADE.
        let changed = tx.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2;",
            params![note_id.to_string(), user_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }

        tx.execute(
            "DELETE FROM notes_fts WHERE note_id = ?1;",
            [note_id.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn list_notes(&self, user_id: UserId, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(user_id.to_string())];

        if !query.all {
            sql.push_str(" AND is_archived = ?");
            bind_values.push(Value::Integer(bool_to_int(query.archived)));
        }

        if let Some(tag) = query.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM note_tags
                    WHERE note_tags.note_id = notes.id
                      AND note_tags.tag = ?
                )",
            );
            bind_values.push(Value::Text(tag.clone()));
        }

        if let Some(search) = query.search.as_ref() {
            if let Some(match_expr) = build_match_expression(search) {
                sql.push_str(
                    " AND id IN (
                        SELECT note_id
                        FROM notes_fts
                        WHERE notes_fts MATCH ?
                    )",
                );
                bind_values.push(Value::Text(match_expr));
            }
        }

        sql.push_str(" ORDER BY is_pinned DESC, last_modified DESC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(self.conn, row)?);
        }

        Ok(notes)
    }

    fn list_tags(&self, user_id: UserId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT note_tags.tag
             FROM note_tags
             INNER JOIN notes ON notes.id = note_tags.note_id
             WHERE notes.user_id = ?1
             ORDER BY note_tags.tag ASC;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get::<_, String>(0)?);
        }
        Ok(tags)
    }
}

/// Builds a safe FTS5 MATCH expression from free text.
///
/// Every whitespace-separated term is quoted and ANDed, so user input can
/// never produce an FTS syntax error. Blank input yields `None`.
fn build_match_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" AND "))
    }
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

fn write_tag_links(conn: &Connection, note: &Note) -> RepoResult<()> {
    for tag in &note.tags {
        conn.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag) VALUES (?1, ?2);",
            params![note.id.to_string(), tag.as_str()],
        )?;
    }
    Ok(())
}

fn write_fts_row(conn: &Connection, note: &Note) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO notes_fts (note_id, title, content, tags)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            note.id.to_string(),
            note.title.as_str(),
            note.content.as_str(),
            note.tags.join(" "),
        ],
    )?;
    Ok(())
}

fn load_tags_for_note(conn: &Connection, note_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag FROM note_tags WHERE note_id = ?1 ORDER BY tag ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get::<_, String>(0)?);
    }
    Ok(tags)
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "notes.id")?;

    let user_id_text: String = row.get("user_id")?;
    let user_id = parse_uuid(&user_id_text, "notes.user_id")?;

    let color_text: String = row.get("color")?;
    let color = NoteColor::parse(&color_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid color `{color_text}` in notes.color"))
    })?;

    let tags = load_tags_for_note(conn, &id_text)?;

    Ok(Note {
        id,
        user_id,
        title: row.get("title")?,
        content: row.get("content")?,
        tags,
        color,
        is_pinned: int_to_bool(row.get("is_pinned")?, "notes.is_pinned")?,
        is_archived: int_to_bool(row.get("is_archived")?, "notes.is_archived")?,
        last_modified: row.get("last_modified")?,
        created_at: row.get("created_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::build_match_expression;

    #[test]
    fn match_expression_quotes_and_joins_terms() {
        assert_eq!(
            build_match_expression("grocery list").as_deref(),
            Some("\"grocery\" AND \"list\"")
        );
    }

    #[test]
    fn match_expression_escapes_embedded_quotes() {
        assert_eq!(
            build_match_expression("say \"hi\"").as_deref(),
            Some("\"say\" AND \"\"\"hi\"\"\"")
        );
    }

    #[test]
    fn blank_search_builds_no_expression() {
        assert_eq!(build_match_expression("   "), None);
    }
}
