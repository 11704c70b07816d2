use notewell_core::db::open_db_in_memory;
use notewell_core::{
    AccountService, NewNote, NewUser, NoteId, NoteListQuery, NoteService, NoteUpdate,
    SqliteDraftRepository, SqliteNoteRepository, SqliteUserRepository, UserId,
};
use rusqlite::Connection;

#[test]
fn default_listing_excludes_archived_notes() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn, "owner@example.com");
    let service = note_service(&conn);

    let active = create_note(&service, user_id, "active", "body", &[]);
    let archived = create_note(&service, user_id, "archived", "body", &[]);
    service.toggle_archive(user_id, archived.id).unwrap();

    let listed = service
        .list_notes(user_id, &NoteListQuery::default())
        .unwrap();
    assert_eq!(ids(&listed), vec![active.id]);
    assert!(listed.iter().all(|note| !note.is_archived));

    let archived_only = service
        .list_notes(
            user_id,
            &NoteListQuery {
                archived: true,
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&archived_only), vec![archived.id]);

    let all = service
        .list_notes(
            user_id,
            &NoteListQuery {
                all: true,
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn listing_orders_pinned_first_then_most_recent() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn, "owner@example.com");
    let service = note_service(&conn);

    let old_pinned = create_note(&service, user_id, "old pinned", "body", &[]);
    let newer = create_note(&service, user_id, "newer", "body", &[]);
    let older = create_note(&service, user_id, "older", "body", &[]);
    service.toggle_pin(user_id, old_pinned.id).unwrap();

    set_last_modified(&conn, old_pinned.id, 1_000);
    set_last_modified(&conn, newer.id, 3_000);
    set_last_modified(&conn, older.id, 2_000);

    let listed = service
        .list_notes(user_id, &NoteListQuery::default())
        .unwrap();
    assert_eq!(ids(&listed), vec![old_pinned.id, newer.id, older.id]);
}

#[test]
fn tag_filter_matches_exact_tag_only() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn, "owner@example.com");
    let service = note_service(&conn);

    let work = create_note(&service, user_id, "work note", "body", &["work"]);
    create_note(&service, user_id, "home note", "body", &["home"]);
    create_note(&service, user_id, "untagged", "body", &[]);

    let filtered = service
        .list_notes(
            user_id,
            &NoteListQuery {
                tag: Some(" work ".to_string()),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&filtered), vec![work.id]);

    let none = service
        .list_notes(
            user_id,
            &NoteListQuery {
                tag: Some("wor".to_string()),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn search_matches_title_content_and_tags() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn, "owner@example.com");
    let service = note_service(&conn);

    let by_title = create_note(&service, user_id, "grocery run", "nothing here", &[]);
    let by_content = create_note(&service, user_id, "misc", "buy grocery bags", &[]);
    let by_tag = create_note(&service, user_id, "list", "stuff", &["grocery"]);
    create_note(&service, user_id, "unrelated", "body", &[]);

    let hits = service
        .list_notes(
            user_id,
            &NoteListQuery {
                search: Some("grocery".to_string()),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    let hit_ids = ids(&hits);
    assert_eq!(hit_ids.len(), 3);
    assert!(hit_ids.contains(&by_title.id));
    assert!(hit_ids.contains(&by_content.id));
    assert!(hit_ids.contains(&by_tag.id));
}

#[test]
fn search_index_follows_note_updates_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn, "owner@example.com");
    let service = note_service(&conn);

    let note = create_note(&service, user_id, "draft title", "placeholder", &[]);
    service
        .update_note(
            user_id,
            note.id,
            &NoteUpdate {
                content: Some("quarterly budget review".to_string()),
                ..NoteUpdate::default()
            },
        )
        .unwrap();

    let hits = service
        .list_notes(
            user_id,
            &NoteListQuery {
                search: Some("budget".to_string()),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&hits), vec![note.id]);

    let stale = service
        .list_notes(
            user_id,
            &NoteListQuery {
                search: Some("placeholder".to_string()),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert!(stale.is_empty());

    service.delete_note(user_id, note.id).unwrap();
    let after_delete = service
        .list_notes(
            user_id,
            &NoteListQuery {
                search: Some("budget".to_string()),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert!(after_delete.is_empty());
}

#[test]
fn blank_search_is_ignored() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn, "owner@example.com");
    let service = note_service(&conn);
    create_note(&service, user_id, "anything", "body", &[]);

    let listed = service
        .list_notes(
            user_id,
            &NoteListQuery {
                search: Some("   ".to_string()),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn listing_is_owner_scoped() {
    let conn = open_db_in_memory().unwrap();
    let first = register_user(&conn, "first@example.com");
    let second = register_user(&conn, "second@example.com");
    let service = note_service(&conn);

    create_note(&service, first, "mine", "body", &[]);

    assert_eq!(
        service
            .list_notes(first, &NoteListQuery::default())
            .unwrap()
            .len(),
        1
    );
    assert!(service
        .list_notes(second, &NoteListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn list_tags_returns_distinct_union_per_owner() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn, "owner@example.com");
    let other = register_user(&conn, "other@example.com");
    let service = note_service(&conn);

    create_note(&service, user_id, "a", "body", &["work", "ideas"]);
    let tagged = create_note(&service, user_id, "b", "body", &["work", "home"]);
    create_note(&service, other, "c", "body", &["foreign"]);

    let tags = service.list_tags(user_id).unwrap();
    assert_eq!(
        tags,
        vec!["home".to_string(), "ideas".to_string(), "work".to_string()]
    );

    // Tag derivation tracks deletion; no persisted index lingers.
    service.delete_note(user_id, tagged.id).unwrap();
    let tags = service.list_tags(user_id).unwrap();
    assert_eq!(tags, vec!["ideas".to_string(), "work".to_string()]);
}

fn ids(notes: &[notewell_core::Note]) -> Vec<NoteId> {
    notes.iter().map(|note| note.id).collect()
}

fn set_last_modified(conn: &Connection, note_id: NoteId, value: i64) {
    conn.execute(
        "UPDATE notes SET last_modified = ?2 WHERE id = ?1;",
        rusqlite::params![note_id.to_string(), value],
    )
    .unwrap();
}

fn note_service(
    conn: &Connection,
) -> NoteService<SqliteNoteRepository<'_>, SqliteDraftRepository<'_>> {
    NoteService::new(
        SqliteNoteRepository::new(conn),
        SqliteDraftRepository::new(conn),
    )
}

fn create_note(
    service: &NoteService<SqliteNoteRepository<'_>, SqliteDraftRepository<'_>>,
    user_id: UserId,
    title: &str,
    content: &str,
    tags: &[&str],
) -> notewell_core::Note {
    service
        .create_note(
            user_id,
            &NewNote {
                title: title.to_string(),
                content: content.to_string(),
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
                ..NewNote::default()
            },
        )
        .unwrap()
}

fn register_user(conn: &Connection, email: &str) -> UserId {
    let service = AccountService::new(SqliteUserRepository::new(conn));
    service
        .register(&NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "Owner".to_string(),
            role: None,
        })
        .unwrap()
        .id
}
