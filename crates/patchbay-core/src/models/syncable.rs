//! Syncable capability shared by patchable entity types

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UserId;

/// Entity families eligible for patch-based synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Note,
    Task,
}

impl ItemType {
    /// Wire name of this item type, as it appears in patches and error codes
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(Self::Note),
            "task" => Ok(Self::Task),
            other => Err(format!("unknown item type: {other}")),
        }
    }
}

/// Storage-level kind of an entity field, used to drive value coercion.
///
/// Each entity declares a closed table of known date and boolean fields;
/// everything else passes through as [`FieldKind::Raw`]. The nullable
/// variants mark fields that the storage layer keeps as true NULLs rather
/// than sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Date/time field, always present
    Date,
    /// Date/time field that may be NULL
    NullableDate,
    /// Boolean field, always present
    Bool,
    /// Boolean field that may be NULL
    NullableBool,
    /// Anything else - stored as received
    Raw,
}

/// Capability marker for entities the sync engine can reconcile.
///
/// An implementation supplies owner identity, timestamps, the static
/// field-kind table for coercion, and domain validation for freshly
/// decoded create payloads.
pub trait Syncable: Clone + Serialize + DeserializeOwned {
    /// The item type patches must carry to address this entity family
    const ITEM_TYPE: ItemType;

    /// String form of this entity's ID, used as the store key
    fn id_str(&self) -> String;

    /// Identity of the entity's owner
    fn owner(&self) -> UserId;

    /// Last server-side modification time
    fn updated_at(&self) -> DateTime<Utc>;

    /// Claim ownership and stamp both timestamps, for freshly created
    /// entities. After this call `created_at == updated_at == now`.
    fn stamp_created(&mut self, owner: UserId, now: DateTime<Utc>);

    /// Kind of the given storage-layer field name
    fn field_kind(storage_key: &str) -> FieldKind;

    /// Domain validation for a decoded create payload
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_round_trip() {
        for item_type in [ItemType::Note, ItemType::Task] {
            let parsed: ItemType = item_type.as_str().parse().unwrap();
            assert_eq!(item_type, parsed);
        }
    }

    #[test]
    fn test_item_type_rejects_unknown() {
        assert!("habit".parse::<ItemType>().is_err());
        assert!("".parse::<ItemType>().is_err());
    }

    #[test]
    fn test_item_type_serde_lowercase() {
        let json = serde_json::to_string(&ItemType::Note).unwrap();
        assert_eq!(json, "\"note\"");
    }
}
