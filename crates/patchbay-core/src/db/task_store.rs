//! SQLite-backed task store

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use rusqlite::types::Value as SqlValue;

use crate::error::{Error, Result};
use crate::models::{Task, UserId};
use crate::store::{EntityStore, UpdatePayload};

use super::{datetime_from_millis, to_sql_value};

/// Columns a patch update may touch
const PATCHABLE_COLUMNS: &[&str] = &[
    "title",
    "description",
    "start_date",
    "end_date",
    "completed",
    "created_at",
    "updated_at",
];

const SELECT_TASK: &str = "SELECT id, user, title, description, start_date, end_date, completed, \
                           created_at, updated_at FROM tasks";

/// SQLite implementation of [`EntityStore`] for tasks
pub struct SqliteTaskStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteTaskStore<'a> {
    /// Create a new store over the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List a user's tasks, newest first
    pub fn list_for_user(&self, user: UserId) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_TASK} WHERE user = ? ORDER BY created_at DESC"))?;
        let tasks = stmt
            .query_map(params![user.as_str()], Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Parse a task from a database row
    fn parse_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        let id: String = row.get(0)?;
        let user: String = row.get(1)?;
        Ok(Task {
            id: id.parse().unwrap_or_default(),
            user: user.parse().unwrap_or_default(),
            title: row.get(2)?,
            description: row.get(3)?,
            start_date: row.get::<_, Option<i64>>(4)?.map(datetime_from_millis),
            end_date: row.get::<_, Option<i64>>(5)?.map(datetime_from_millis),
            completed: row.get::<_, Option<i64>>(6)?.map(|flag| flag != 0),
            created_at: datetime_from_millis(row.get(7)?),
            updated_at: datetime_from_millis(row.get(8)?),
        })
    }
}

impl EntityStore for SqliteTaskStore<'_> {
    type Entity = Task;

    fn fetch(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("{SELECT_TASK} WHERE id = ?"),
                params![id],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }

    fn create(&self, task: &Task) -> Result<Task> {
        self.conn.execute(
            "INSERT INTO tasks (id, user, title, description, start_date, end_date, completed, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                task.id.as_str(),
                task.user.as_str(),
                task.title,
                task.description,
                task.start_date.map(|date| date.timestamp_millis()),
                task.end_date.map(|date| date.timestamp_millis()),
                task.completed.map(i64::from),
                task.created_at.timestamp_millis(),
                task.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(task.clone())
    }

    fn apply_update(&self, id: &str, payload: &UpdatePayload) -> Result<Task> {
        if payload.is_empty() {
            return Err(Error::InvalidInput("empty update payload".to_string()));
        }

        let mut assignments = Vec::with_capacity(payload.len());
        let mut values: Vec<SqlValue> = Vec::with_capacity(payload.len() + 1);
        for (key, value) in payload {
            if !PATCHABLE_COLUMNS.contains(&key.as_str()) {
                return Err(Error::InvalidInput(format!("unknown task field: {key}")));
            }
            assignments.push(format!("{key} = ?"));
            values.push(to_sql_value(value));
        }
        values.push(SqlValue::Text(id.to_string()));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", assignments.join(", "));
        self.conn.execute(&sql, params_from_iter(values))?;

        self.fetch(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?", params![id])?;
        Ok(())
    }
}
