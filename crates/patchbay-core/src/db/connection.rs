//! Database connection management

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

use super::migrations;

/// SQLite database wrapper.
///
/// Opening runs pending migrations automatically. The underlying
/// connection is exposed for the per-entity stores to borrow.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database file at the given path, creating it if it doesn't
    /// exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }
}
