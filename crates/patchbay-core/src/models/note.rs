//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{FieldKind, ItemType, Syncable, UserId};

/// A unique identifier for a note, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A note owned by a user.
///
/// Create payloads may omit `id`, `user`, and the timestamps; the sync
/// engine mints an ID and stamps ownership and times server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    #[serde(default)]
    pub id: NoteId,
    /// Owner identity
    #[serde(default)]
    pub user: UserId,
    /// Note title
    #[serde(default)]
    pub title: Option<String>,
    /// Note body
    #[serde(default)]
    pub content: Option<String>,
    /// Soft delete flag for sync
    #[serde(default)]
    pub deleted: Option<bool>,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new note with the given owner and title
    #[must_use]
    pub fn new(user: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            user,
            title: Some(title.into()),
            content: None,
            deleted: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Syncable for Note {
    const ITEM_TYPE: ItemType = ItemType::Note;

    fn id_str(&self) -> String {
        self.id.as_str()
    }

    fn owner(&self) -> UserId {
        self.user
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn stamp_created(&mut self, owner: UserId, now: DateTime<Utc>) {
        self.user = owner;
        self.created_at = now;
        self.updated_at = now;
    }

    fn field_kind(storage_key: &str) -> FieldKind {
        match storage_key {
            "created_at" | "updated_at" => FieldKind::Date,
            "deleted" => FieldKind::NullableBool,
            _ => FieldKind::Raw,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) if !title.trim().is_empty() => Ok(()),
            _ => Err("note title is required".to_string()),
        }
    }
}
