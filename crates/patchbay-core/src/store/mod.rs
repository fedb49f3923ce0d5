//! Entity storage abstraction
//!
//! The sync engine never talks to a database directly; it is handed an
//! [`EntityStore`] at construction time and issues single-entity
//! fetch/create/update/delete calls through it.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::Result;
use crate::models::Syncable;

/// A coerced field value, ready to be persisted.
///
/// The closed set of variants keeps the coercion step a pure function over
/// known field kinds instead of a runtime type switch. `Date(None)` and
/// `Bool(None)` are true NULLs - nullable fields must never collapse into
/// sentinel values on the way to storage.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A canonical timestamp, or NULL
    Date(Option<DateTime<Utc>>),
    /// A native boolean, or NULL
    Bool(Option<bool>),
    /// Anything outside the known date/bool field sets, stored as received
    Raw(serde_json::Value),
}

impl FieldValue {
    /// JSON representation used by document-shaped stores
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Date(Some(date)) => {
                // Nanosecond precision so a JSON round trip is lossless
                serde_json::Value::String(date.to_rfc3339_opts(SecondsFormat::Nanos, true))
            }
            Self::Bool(Some(value)) => serde_json::Value::Bool(value),
            Self::Date(None) | Self::Bool(None) => serde_json::Value::Null,
            Self::Raw(value) => value,
        }
    }
}

/// One update's worth of storage-keyed field mutations, in patch order
pub type UpdatePayload = Vec<(String, FieldValue)>;

/// Persistence collaborator for one syncable entity family.
///
/// Implementations own timestamp bumping only insofar as the payload tells
/// them to; the engine stamps `updated_at` into every update payload it
/// builds. Single-entity writes are assumed atomic; no cross-call locking
/// is provided (see the conflict model in [`crate::sync`]).
pub trait EntityStore {
    /// The entity family this store persists
    type Entity: Syncable;

    /// Fetch an entity by ID; `Ok(None)` when it does not exist
    fn fetch(&self, id: &str) -> Result<Option<Self::Entity>>;

    /// Persist a new entity
    fn create(&self, entity: &Self::Entity) -> Result<Self::Entity>;

    /// Apply a field-level update and return the stored entity
    fn apply_update(&self, id: &str, payload: &UpdatePayload) -> Result<Self::Entity>;

    /// Delete an entity by ID
    fn delete(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_into_json_preserves_null() {
        assert_eq!(FieldValue::Date(None).into_json(), serde_json::Value::Null);
        assert_eq!(FieldValue::Bool(None).into_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_into_json_date_is_rfc3339() {
        let date = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let json = FieldValue::Date(Some(date)).into_json();
        assert_eq!(json, serde_json::json!("2026-08-30T12:00:00.000000000Z"));
    }
}
