//! Task model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{FieldKind, ItemType, Syncable, UserId};

/// A unique identifier for a task, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a new unique task ID using UUID v7
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

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A task owned by a user.
///
/// `start_date`, `end_date`, and `completed` are nullable at the storage
/// layer; their absence is meaningful and must not collapse into a
/// sentinel value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    #[serde(default)]
    pub id: TaskId,
    /// Owner identity
    #[serde(default)]
    pub user: UserId,
    /// Task title
    pub title: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled start, if any
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Scheduled end, if any
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Completion flag, unset until first toggled
    #[serde(default)]
    pub completed: Option<bool>,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with the given owner and title
    #[must_use]
    pub fn new(user: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            user,
            title: title.into(),
            description: None,
            start_date: None,
            end_date: None,
            completed: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Syncable for Task {
    const ITEM_TYPE: ItemType = ItemType::Task;

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
            "start_date" | "end_date" => FieldKind::NullableDate,
            "completed" => FieldKind::NullableBool,
            _ => FieldKind::Raw,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("task title is required".to_string());
        }
        Ok(())
    }
}
