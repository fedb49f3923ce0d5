//! Patch wire types
//!
//! A patch is a single client-declared intent to create, update, or delete
//! one entity, carrying the client's view of when the edit was made.
//! Patches are ephemeral: decoded from an inbound batch, consumed by the
//! dispatcher, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three actions a patch may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    Create,
    Update,
    Delete,
}

impl PatchAction {
    /// Wire name of this action
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown patch action: {other}")),
        }
    }
}

/// One field mutation inside a patch.
///
/// For `create` there is exactly one change, keyed `"data"`, whose value is
/// the full entity representation. For `update` each change mutates one
/// field, keyed by the client-side field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchChange {
    /// Client-side field name
    pub key: String,
    /// Untyped field value as received
    pub value: serde_json::Value,
}

/// A client-originated edit to one entity.
///
/// `action` and `item_type` are kept as raw strings: an unknown action or
/// type is a recoverable per-patch error, not a batch decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    /// Client-assigned patch identifier (opaque)
    pub id: String,
    /// Declared action: create, update, or delete
    pub action: String,
    /// Declared entity family
    pub item_type: String,
    /// Target entity ID; required unless `action` is create
    #[serde(default)]
    pub item_id: Option<String>,
    /// Ordered field mutations
    #[serde(default)]
    pub changes: Vec<PatchChange>,
    /// Client's timestamp for this edit
    pub patch_date: DateTime<Utc>,
    /// Apply despite detected staleness
    #[serde(default)]
    pub force: Option<bool>,
}

impl Patch {
    /// Whether the client asked to override conflict detection
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.force.unwrap_or(false)
    }
}

/// A per-patch failure, reported instead of applying the patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchError {
    /// ID of the failed patch
    pub patch_id: String,
    /// Code from the fixed taxonomy (see [`codes`])
    pub error_code: String,
}

/// A detected staleness, reported with the current server-side entity so
/// the client can present a resolution choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictedItem {
    /// Entity family of the conflicted item
    #[serde(rename = "type")]
    pub item_type: String,
    /// ID of the stale patch
    pub patch_id: String,
    /// The entity as currently stored on the server
    pub remote_object: serde_json::Value,
}

/// Outcome of one batch: three disjoint sets plus a completion timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// IDs of patches that applied
    pub success: Vec<String>,
    /// Patches rejected with an error code
    pub errors: Vec<PatchError>,
    /// Patches held back as stale
    pub conflicts: Vec<ConflictedItem>,
    /// Server timestamp of batch completion
    pub date: DateTime<Utc>,
}

/// Error code taxonomy for per-patch failures
pub mod codes {
    use crate::models::ItemType;

    pub const ITEM_TYPE_NOT_SUPPORTED: &str = "item_type_not_supported";
    pub const INVALID_ACTION: &str = "invalid_action";
    pub const ITEM_ID_REQUIRED: &str = "item_id_required";
    pub const NOT_AUTHORIZED: &str = "not_authorized";
    pub const CREATE_FAILED: &str = "create_failed";
    pub const UPDATE_FAILED: &str = "update_failed";
    pub const DELETE_FAILED: &str = "delete_failed";

    /// `<type>_not_found`
    #[must_use]
    pub fn not_found(item_type: ItemType) -> String {
        format!("{item_type}_not_found")
    }

    /// `invalid_<type>_data`
    #[must_use]
    pub fn invalid_data(item_type: ItemType) -> String {
        format!("invalid_{item_type}_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_action_round_trip() {
        for action in [PatchAction::Create, PatchAction::Update, PatchAction::Delete] {
            let parsed: PatchAction = action.as_str().parse().unwrap();
            assert_eq!(action, parsed);
        }
        assert!("bogus".parse::<PatchAction>().is_err());
    }

    #[test]
    fn test_patch_decodes_camel_case_wire_names() {
        let patch: Patch = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "action": "update",
            "itemType": "note",
            "itemId": "n1",
            "changes": [{"key": "title", "value": "Hello"}],
            "patchDate": "2026-08-30T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(patch.item_id.as_deref(), Some("n1"));
        assert_eq!(patch.changes.len(), 1);
        assert!(!patch.is_forced());
    }

    #[test]
    fn test_patch_with_unknown_action_still_decodes() {
        let patch: Patch = serde_json::from_value(serde_json::json!({
            "id": "p2",
            "action": "bogus",
            "itemType": "note",
            "patchDate": "2026-08-30T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(patch.action, "bogus");
        assert!(patch.changes.is_empty());
    }

    #[test]
    fn test_batch_result_wire_shape() {
        let result = BatchResult {
            success: vec!["p1".to_string()],
            errors: vec![PatchError {
                patch_id: "p2".to_string(),
                error_code: codes::INVALID_ACTION.to_string(),
            }],
            conflicts: vec![],
            date: Utc::now(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"][0], "p1");
        assert_eq!(json["errors"][0]["patchId"], "p2");
        assert_eq!(json["errors"][0]["errorCode"], "invalid_action");
    }

    #[test]
    fn test_conflict_serializes_type_field() {
        let conflict = ConflictedItem {
            item_type: "note".to_string(),
            patch_id: "p3".to_string(),
            remote_object: serde_json::json!({"id": "n1"}),
        };
        let json = serde_json::to_value(&conflict).unwrap();
        assert_eq!(json["type"], "note");
        assert_eq!(json["patchId"], "p3");
        assert_eq!(json["remoteObject"]["id"], "n1");
    }

    #[test]
    fn test_dynamic_codes() {
        use crate::models::ItemType;
        assert_eq!(codes::not_found(ItemType::Note), "note_not_found");
        assert_eq!(codes::invalid_data(ItemType::Task), "invalid_task_data");
    }
}
