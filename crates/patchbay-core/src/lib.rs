//! patchbay-core - Core library for patchbay
//!
//! This crate contains the syncable entity models, the patch-based
//! synchronization engine, and the storage layer used by all patchbay
//! interfaces.

pub mod db;
pub mod error;
pub mod models;
pub mod patch;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
pub use models::{ItemType, Note, NoteId, Syncable, Task, TaskId, UserId};
pub use patch::{BatchResult, ConflictedItem, Patch, PatchChange, PatchError};
pub use store::EntityStore;
pub use sync::PatchDispatcher;
