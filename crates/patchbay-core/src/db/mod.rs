//! Database layer for patchbay

mod connection;
mod migrations;
mod note_store;
mod task_store;
mod value;

pub use connection::Database;
pub use note_store::SqliteNoteStore;
pub use task_store::SqliteTaskStore;

pub(crate) use value::{datetime_from_millis, to_sql_value};
