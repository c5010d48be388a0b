//! SQLite-backed note store.
//!
//! # Invariants
//! - Each mutation is a single SQL statement, so a note is never left
//!   partially updated.
//! - `updated_at` strictly increases per note, even when two writes land in
//!   the same millisecond.
//! - Text search goes through the `notes_fts` external-content index.

use super::{NoteSearch, NoteStore, StoreError, StoreResult};
use crate::model::note::{ActorId, Note, NoteFields, NoteId, NoteInput, Visibility, CATEGORY_ALL};
use crate::search::build_match_expression;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const NOTE_COLUMNS: &str = "
    n.id AS id,
    n.owner AS owner,
    n.title AS title,
    n.content AS content,
    n.category AS category,
    n.visibility AS visibility,
    n.created_at AS created_at,
    n.updated_at AS updated_at";

const RETURNING_COLUMNS: &str =
    "id, owner, title, content, category, visibility, created_at, updated_at";

/// Note store over a migrated SQLite connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_notes(&self, sql: &str, bind_values: Vec<Value>) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn create(&self, owner: &ActorId, input: &NoteInput) -> StoreResult<Note> {
        let fields = input.resolve()?;
        let id = Uuid::new_v4();
        let now = now_epoch_ms();

        self.conn.execute(
            "INSERT INTO notes (
                id,
                owner,
                title,
                content,
                category,
                visibility,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![
                id.to_string(),
                owner.as_str(),
                fields.title.as_str(),
                fields.content.as_str(),
                fields.category.as_str(),
                fields.visibility.as_str(),
                now,
            ],
        )?;

        Ok(Note {
            id,
            owner: owner.clone(),
            title: fields.title,
            content: fields.content,
            category: fields.category,
            visibility: fields.visibility,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes n WHERE n.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn update(&self, id: NoteId, fields: &NoteFields) -> StoreResult<Note> {
        let fields = fields.clone().normalized()?;
        let updated = self
            .conn
            .query_row(
                &format!(
                    "UPDATE notes
                     SET
                        title = ?2,
                        content = ?3,
                        category = ?4,
                        visibility = ?5,
                        updated_at = MAX(?6, updated_at + 1)
                     WHERE id = ?1
                     RETURNING {RETURNING_COLUMNS};"
                ),
                params![
                    id.to_string(),
                    fields.title.as_str(),
                    fields.content.as_str(),
                    fields.category.as_str(),
                    fields.visibility.as_str(),
                    now_epoch_ms(),
                ],
                |row| Ok(parse_note_row(row)),
            )
            .optional()?;

        match updated {
            Some(note) => note,
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn delete(&self, id: NoteId) -> StoreResult<Note> {
        let deleted = self
            .conn
            .query_row(
                &format!("DELETE FROM notes WHERE id = ?1 RETURNING {RETURNING_COLUMNS};"),
                [id.to_string()],
                |row| Ok(parse_note_row(row)),
            )
            .optional()?;

        match deleted {
            Some(note) => note,
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn list_by_owner(&self, owner: &ActorId) -> StoreResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {NOTE_COLUMNS}
                 FROM notes n
                 WHERE n.owner = ?
                 ORDER BY n.updated_at DESC, n.id ASC;"
            ),
            vec![Value::Text(owner.as_str().to_string())],
        )
    }

    fn list_public(&self) -> StoreResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {NOTE_COLUMNS}
                 FROM notes n
                 WHERE n.visibility = ?
                 ORDER BY n.updated_at DESC, n.id ASC;"
            ),
            vec![Value::Text(Visibility::Public.as_str().to_string())],
        )
    }

    fn search(&self, owner: &ActorId, query: &NoteSearch) -> StoreResult<Vec<Note>> {
        // Only missing or empty text skips the text filter; text without any
        // word tokens can match nothing.
        let match_expr = match query.text.as_deref().filter(|text| !text.is_empty()) {
            None => None,
            Some(text) => match build_match_expression(text) {
                Some(expr) => Some(expr),
                None => {
                    debug!(
                        "event=note_search module=store status=ok text_filter=true terms=0 hits=0"
                    );
                    return Ok(Vec::new());
                }
            },
        };
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != CATEGORY_ALL);

        let mut sql = format!("SELECT {NOTE_COLUMNS} FROM notes n");
        let mut bind_values: Vec<Value> = Vec::new();

        if match_expr.is_some() {
            sql.push_str(" JOIN notes_fts ON notes_fts.rowid = n.seq");
        }

        sql.push_str(" WHERE n.owner = ?");
        bind_values.push(Value::Text(owner.as_str().to_string()));

        if let Some(expr) = match_expr.as_ref() {
            sql.push_str(" AND notes_fts MATCH ?");
            bind_values.push(Value::Text(expr.clone()));
        }

        if let Some(category) = category {
            sql.push_str(" AND n.category = ?");
            bind_values.push(Value::Text(category.to_string()));
        }

        if match_expr.is_some() {
            sql.push_str(" ORDER BY n.updated_at DESC, bm25(notes_fts), n.id ASC;");
        } else {
            sql.push_str(" ORDER BY n.updated_at DESC, n.id ASC;");
        }

        let notes = self.query_notes(&sql, bind_values)?;
        debug!(
            "event=note_search module=store status=ok text_filter={} category_filter={} hits={}",
            match_expr.is_some(),
            category.is_some(),
            notes.len()
        );
        Ok(notes)
    }

    fn distinct_categories(&self, owner: &ActorId) -> StoreResult<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM notes WHERE owner = ?1;")?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut categories = BTreeSet::new();
        while let Some(row) = rows.next()? {
            categories.insert(row.get::<_, String>(0)?);
        }
        Ok(categories)
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{id_text}` in notes.id")))?;

    let owner_text: String = row.get("owner")?;
    let owner = ActorId::new(owner_text)
        .map_err(|_| StoreError::InvalidData(format!("blank owner for note {id}")))?;

    let visibility_text: String = row.get("visibility")?;
    let visibility = Visibility::parse(&visibility_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid visibility `{visibility_text}` in notes.visibility"
        ))
    })?;

    let note = Note {
        id,
        owner,
        title: row.get("title")?,
        content: row.get("content")?,
        category: row.get("category")?,
        visibility,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    note.fields().validate().map_err(|err| {
        StoreError::InvalidData(format!("note {id} violates field invariants: {err}"))
    })?;
    Ok(note)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
