use notevault_core::db::open_db_in_memory;
use notevault_core::{
    ActorId, NoteFields, NoteInput, NoteStore, NoteValidationError, SqliteNoteStore, StoreError,
    Visibility, DEFAULT_CATEGORY,
};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use uuid::Uuid;

fn actor(id: &str) -> ActorId {
    ActorId::new(id).unwrap()
}

fn set_timestamps(conn: &Connection, id: Uuid, updated_at: i64) {
    conn.execute(
        "UPDATE notes SET created_at = ?2, updated_at = ?2 WHERE id = ?1;",
        params![id.to_string(), updated_at],
    )
    .unwrap();
}

#[test]
fn create_applies_defaults_and_equal_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);

    let note = store.create(&actor("alice"), &NoteInput::new("X")).unwrap();
    assert_eq!(note.title, "X");
    assert_eq!(note.content, "");
    assert_eq!(note.category, DEFAULT_CATEGORY);
    assert_eq!(note.visibility, Visibility::Private);
    assert_eq!(note.created_at, note.updated_at);

    let loaded = store.get_by_id(note.id).unwrap().unwrap();
    assert_eq!(loaded, note);
}

#[test]
fn create_rejects_empty_title() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);

    let err = store.create(&actor("alice"), &NoteInput::new("  ")).unwrap_err();
    assert!(matches!(err, StoreError::Validation(NoteValidationError::EmptyTitle)));
    assert!(store.list_by_owner(&actor("alice")).unwrap().is_empty());
}

#[test]
fn update_with_unchanged_fields_only_moves_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    let created = store
        .create(
            &actor("alice"),
            &NoteInput::new("Groceries")
                .with_content("milk and eggs")
                .with_category("Home")
                .with_visibility(Visibility::Public),
        )
        .unwrap();

    let updated = store.update(created.id, &created.fields()).unwrap();
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.owner, created.owner);
    assert_eq!(updated.fields(), created.fields());
}

#[test]
fn update_replaces_fields_and_keeps_owner() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    let created = store.create(&actor("alice"), &NoteInput::new("Draft")).unwrap();

    let fields = NoteFields {
        title: "Final".to_string(),
        content: "body".to_string(),
        category: "Work".to_string(),
        visibility: Visibility::Public,
    };
    let updated = store.update(created.id, &fields).unwrap();
    assert_eq!(updated.fields(), fields);
    assert_eq!(updated.owner, actor("alice"));
}

#[test]
fn update_rejects_empty_title_and_missing_note() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    let created = store.create(&actor("alice"), &NoteInput::new("Keep")).unwrap();

    let mut blank = created.fields();
    blank.title = String::new();
    let err = store.update(created.id, &blank).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get_by_id(created.id).unwrap().unwrap().title, "Keep");

    let missing = Uuid::new_v4();
    let err = store.update(missing, &created.fields()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
}

#[test]
fn delete_returns_snapshot_then_note_is_gone() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    let created = store.create(&actor("alice"), &NoteInput::new("Temp")).unwrap();

    let snapshot = store.delete(created.id).unwrap();
    assert_eq!(snapshot, created);
    assert!(store.get_by_id(created.id).unwrap().is_none());

    let err = store.delete(created.id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn list_by_owner_is_scoped_and_sorted_by_updated_at_desc() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    let older = store.create(&actor("alice"), &NoteInput::new("older")).unwrap();
    let newer = store.create(&actor("alice"), &NoteInput::new("newer")).unwrap();
    store.create(&actor("bob"), &NoteInput::new("bob's")).unwrap();
    set_timestamps(&conn, older.id, 1_000);
    set_timestamps(&conn, newer.id, 2_000);

    let listed = store.list_by_owner(&actor("alice")).unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[test]
fn list_public_returns_only_public_notes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    let public = store
        .create(
            &actor("alice"),
            &NoteInput::new("shared").with_visibility(Visibility::Public),
        )
        .unwrap();
    store.create(&actor("alice"), &NoteInput::new("secret")).unwrap();

    let listed = store.list_public().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, public.id);
}

#[test]
fn distinct_categories_only_cover_owner_notes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    for category in ["Work", "Home", "Work"] {
        store
            .create(&actor("alice"), &NoteInput::new("n").with_category(category))
            .unwrap();
    }
    store.create(&actor("alice"), &NoteInput::new("n")).unwrap();
    store
        .create(
            &actor("bob"),
            &NoteInput::new("n")
                .with_category("Travel")
                .with_visibility(Visibility::Public),
        )
        .unwrap();

    let categories = store.distinct_categories(&actor("alice")).unwrap();
    let expected: BTreeSet<String> = ["General", "Home", "Work"]
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(categories, expected);
}

#[test]
fn corrupt_visibility_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::new(&conn);
    let created = store.create(&actor("alice"), &NoteInput::new("x")).unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;").unwrap();
    conn.execute(
        "UPDATE notes SET visibility = 'friends' WHERE id = ?1;",
        [created.id.to_string()],
    )
    .unwrap();

    let err = store.get_by_id(created.id).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}
