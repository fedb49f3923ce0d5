//! Patch-based synchronization engine
//!
//! Reconciles a batch of client-originated patches against authoritative
//! server state. Patches are processed strictly in input order and fully
//! independently: one patch's failure never cancels or rolls back
//! another's effect. Every per-patch failure is converted into an error
//! code at the patch boundary; the batch loop itself never fails.
//!
//! There is no locking between the staleness check and the subsequent
//! write. Two concurrent batches targeting the same entity can both pass
//! the check and both write; the second write wins. This matches the
//! store's single-document atomicity model.

mod coerce;
mod conflict;
mod keys;

pub use coerce::{coerce, CoerceError};
pub use conflict::is_conflicted;
pub use keys::normalize_key;

use chrono::Utc;
use tracing::{debug, warn};

use crate::models::{Syncable, UserId};
use crate::patch::{codes, BatchResult, ConflictedItem, Patch, PatchAction, PatchError};
use crate::store::{EntityStore, FieldValue, UpdatePayload};

/// Per-patch outcome, accumulated into the three disjoint result sets
enum Outcome {
    Applied,
    Rejected(String),
    Conflicted(serde_json::Value),
}

/// Processes patch batches for one syncable entity family.
///
/// The store collaborator is injected at construction time; the dispatcher
/// holds no other state and a single instance can serve any number of
/// batches.
pub struct PatchDispatcher<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> PatchDispatcher<S> {
    /// Create a dispatcher over the given entity store
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Process a batch of patches on behalf of `caller`.
    ///
    /// Returns the three disjoint outcome sets plus the completion
    /// timestamp. Never fails: infrastructure errors surface as per-patch
    /// error codes.
    pub fn process(&self, caller: UserId, patches: &[Patch]) -> BatchResult {
        let mut success = Vec::new();
        let mut errors = Vec::new();
        let mut conflicts = Vec::new();

        for patch in patches {
            match self.apply_one(caller, patch) {
                Outcome::Applied => success.push(patch.id.clone()),
                Outcome::Rejected(error_code) => {
                    debug!(patch_id = %patch.id, code = %error_code, "patch rejected");
                    errors.push(PatchError {
                        patch_id: patch.id.clone(),
                        error_code,
                    });
                }
                Outcome::Conflicted(remote_object) => {
                    debug!(patch_id = %patch.id, "patch conflicted");
                    conflicts.push(ConflictedItem {
                        item_type: S::Entity::ITEM_TYPE.as_str().to_string(),
                        patch_id: patch.id.clone(),
                        remote_object,
                    });
                }
            }
        }

        BatchResult {
            success,
            errors,
            conflicts,
            date: Utc::now(),
        }
    }

    fn apply_one(&self, caller: UserId, patch: &Patch) -> Outcome {
        let item_type = S::Entity::ITEM_TYPE;
        if patch.item_type != item_type.as_str() {
            return Outcome::Rejected(codes::ITEM_TYPE_NOT_SUPPORTED.to_string());
        }

        let Ok(action) = patch.action.parse::<PatchAction>() else {
            return Outcome::Rejected(codes::INVALID_ACTION.to_string());
        };

        if action == PatchAction::Create {
            return self.handle_create(caller, patch);
        }

        let Some(item_id) = patch.item_id.as_deref() else {
            return Outcome::Rejected(codes::ITEM_ID_REQUIRED.to_string());
        };

        let entity = match self.store.fetch(item_id) {
            Ok(Some(entity)) => entity,
            Ok(None) => return Outcome::Rejected(codes::not_found(item_type)),
            Err(error) => {
                warn!(patch_id = %patch.id, %error, "entity fetch failed");
                return Outcome::Rejected(codes::not_found(item_type));
            }
        };

        if is_conflicted(patch, action, entity.updated_at()) {
            let remote = serde_json::to_value(&entity).unwrap_or(serde_json::Value::Null);
            return Outcome::Conflicted(remote);
        }

        if entity.owner() != caller {
            return Outcome::Rejected(codes::NOT_AUTHORIZED.to_string());
        }

        if action == PatchAction::Update {
            self.handle_update(patch, item_id)
        } else {
            self.handle_delete(patch, item_id)
        }
    }

    fn handle_create(&self, caller: UserId, patch: &Patch) -> Outcome {
        let item_type = S::Entity::ITEM_TYPE;

        // The full entity representation travels under the "data" key of
        // the single change; a decode failure is recoverable per patch.
        let Some(data) = patch.changes.iter().find(|change| change.key == "data") else {
            return Outcome::Rejected(codes::invalid_data(item_type));
        };
        let mut entity: S::Entity = match serde_json::from_value(data.value.clone()) {
            Ok(entity) => entity,
            Err(error) => {
                debug!(patch_id = %patch.id, %error, "create payload decode failed");
                return Outcome::Rejected(codes::invalid_data(item_type));
            }
        };
        if let Err(reason) = entity.validate() {
            debug!(patch_id = %patch.id, %reason, "create payload validation failed");
            return Outcome::Rejected(codes::invalid_data(item_type));
        }

        entity.stamp_created(caller, Utc::now());

        match self.store.create(&entity) {
            Ok(_) => Outcome::Applied,
            Err(error) => {
                warn!(patch_id = %patch.id, %error, "entity create failed");
                Outcome::Rejected(codes::CREATE_FAILED.to_string())
            }
        }
    }

    fn handle_update(&self, patch: &Patch, item_id: &str) -> Outcome {
        let mut payload: UpdatePayload = Vec::with_capacity(patch.changes.len() + 1);
        for change in &patch.changes {
            let storage_key = normalize_key(&change.key);
            let kind = S::Entity::field_kind(&storage_key);
            match coerce(kind, &storage_key, &change.value) {
                Ok(value) => payload.push((storage_key, value)),
                Err(error) => {
                    warn!(patch_id = %patch.id, %error, "field coercion failed");
                    return Outcome::Rejected(codes::UPDATE_FAILED.to_string());
                }
            }
        }
        payload.push(("updated_at".to_string(), FieldValue::Date(Some(Utc::now()))));

        match self.store.apply_update(item_id, &payload) {
            Ok(_) => Outcome::Applied,
            Err(error) => {
                warn!(patch_id = %patch.id, %error, "entity update failed");
                Outcome::Rejected(codes::UPDATE_FAILED.to_string())
            }
        }
    }

    fn handle_delete(&self, patch: &Patch, item_id: &str) -> Outcome {
        match self.store.delete(item_id) {
            Ok(()) => Outcome::Applied,
            Err(error) => {
                warn!(patch_id = %patch.id, %error, "entity delete failed");
                Outcome::Rejected(codes::DELETE_FAILED.to_string())
            }
        }
    }
}
