//! Data models for patchbay

mod note;
mod syncable;
mod task;
mod user;

pub use note::{Note, NoteId};
pub use syncable::{FieldKind, ItemType, Syncable};
pub use task::{Task, TaskId};
pub use user::UserId;
