//! Staleness detection
//!
//! Coarse last-writer-wins: a non-create patch is stale when its declared
//! client timestamp predates the entity's last server-side modification.
//! Field-level overlap is not inspected, so two non-overlapping edits can
//! still conflict when their timestamps disagree.

use chrono::{DateTime, Utc};

use crate::patch::{Patch, PatchAction};

/// Decide whether a patch is stale relative to the stored entity.
///
/// `force = true` unconditionally bypasses the check; clients set it to
/// overwrite after a user has reviewed a reported conflict. Create patches
/// never conflict - there is no stored entity to be stale against.
#[must_use]
pub fn is_conflicted(
    patch: &Patch,
    action: PatchAction,
    remote_updated_at: DateTime<Utc>,
) -> bool {
    if action == PatchAction::Create || patch.is_forced() {
        return false;
    }
    patch.patch_date < remote_updated_at
}
