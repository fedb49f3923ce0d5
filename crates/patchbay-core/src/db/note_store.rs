//! SQLite-backed note store

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use rusqlite::types::Value as SqlValue;

use crate::error::{Error, Result};
use crate::models::{Note, UserId};
use crate::store::{EntityStore, UpdatePayload};

use super::{datetime_from_millis, to_sql_value};

/// Columns a patch update may touch. Unlike a document store, a
/// relational schema cannot accept arbitrary keys.
const PATCHABLE_COLUMNS: &[&str] = &["title", "content", "deleted", "created_at", "updated_at"];

const SELECT_NOTE: &str =
    "SELECT id, user, title, content, deleted, created_at, updated_at FROM notes";

/// SQLite implementation of [`EntityStore`] for notes
pub struct SqliteNoteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteNoteStore<'a> {
    /// Create a new store over the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List a user's notes, newest first
    pub fn list_for_user(&self, user: UserId) -> Result<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_NOTE} WHERE user = ? ORDER BY created_at DESC"))?;
        let notes = stmt
            .query_map(params![user.as_str()], Self::parse_note)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notes)
    }

    /// Parse a note from a database row
    fn parse_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
        let id: String = row.get(0)?;
        let user: String = row.get(1)?;
        Ok(Note {
            id: id.parse().unwrap_or_default(),
            user: user.parse().unwrap_or_default(),
            title: row.get(2)?,
            content: row.get(3)?,
            deleted: row.get::<_, Option<i64>>(4)?.map(|flag| flag != 0),
            created_at: datetime_from_millis(row.get(5)?),
            updated_at: datetime_from_millis(row.get(6)?),
        })
    }
}

impl EntityStore for SqliteNoteStore<'_> {
    type Entity = Note;

    fn fetch(&self, id: &str) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{SELECT_NOTE} WHERE id = ?"),
                params![id],
                Self::parse_note,
            )
            .optional()?;
        Ok(note)
    }

    fn create(&self, note: &Note) -> Result<Note> {
        self.conn.execute(
            "INSERT INTO notes (id, user, title, content, deleted, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                note.id.as_str(),
                note.user.as_str(),
                note.title,
                note.content,
                note.deleted.map(i64::from),
                note.created_at.timestamp_millis(),
                note.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(note.clone())
    }

    fn apply_update(&self, id: &str, payload: &UpdatePayload) -> Result<Note> {
        if payload.is_empty() {
            return Err(Error::InvalidInput("empty update payload".to_string()));
        }

        let mut assignments = Vec::with_capacity(payload.len());
        let mut values: Vec<SqlValue> = Vec::with_capacity(payload.len() + 1);
        for (key, value) in payload {
            if !PATCHABLE_COLUMNS.contains(&key.as_str()) {
                return Err(Error::InvalidInput(format!("unknown note field: {key}")));
            }
            assignments.push(format!("{key} = ?"));
            values.push(to_sql_value(value));
        }
        values.push(SqlValue::Text(id.to_string()));

        let sql = format!("UPDATE notes SET {} WHERE id = ?", assignments.join(", "));
        self.conn.execute(&sql, params_from_iter(values))?;

        self.fetch(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM notes WHERE id = ?", params![id])?;
        Ok(())
    }
}
