//! Reorder coordination.
//!
//! # Responsibility
//! - Check a proposed order against the current children of one parent.
//! - Commit dense positions and the parent ordering array atomically.
//!
//! # Invariants
//! - The proposed order must contain every current child exactly once;
//!   otherwise nothing is written.
//! - Concurrent full reorders of the same parent are last-writer-wins. A
//!   reorder racing with a create or delete is rejected by the commit-time
//!   membership check.

use super::error::{BoardError, BoardResult, MembershipMismatch};
use super::ownership::resolve_group;
use crate::model::user::UserId;
use crate::position::{PositionUpdate, SiblingGroup};
use crate::repo::BoardStore;
use std::collections::HashSet;
use uuid::Uuid;

/// Compares the proposed order with the current children as sets.
pub fn validate_membership(
    group: SiblingGroup,
    current: &[Uuid],
    proposed: &[Uuid],
) -> Result<(), MembershipMismatch> {
    let current_set: HashSet<Uuid> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(proposed.len());
    let mut mismatch = MembershipMismatch::new(group);

    for id in proposed {
        if !seen.insert(*id) {
            if !mismatch.duplicates.contains(id) {
                mismatch.duplicates.push(*id);
            }
        } else if !current_set.contains(id) {
            mismatch.unexpected.push(*id);
        }
    }
    mismatch.missing = current
        .iter()
        .filter(|id| !seen.contains(*id))
        .copied()
        .collect();

    if mismatch.missing.is_empty()
        && mismatch.unexpected.is_empty()
        && mismatch.duplicates.is_empty()
    {
        return Ok(());
    }
    Err(mismatch)
}

/// Replaces the complete order of `group` with `proposed`.
///
/// Returns the committed `(id, position)` pairs in proposed order.
pub fn reorder<S: BoardStore + ?Sized>(
    store: &S,
    group: SiblingGroup,
    proposed: &[Uuid],
    principal: UserId,
) -> BoardResult<Vec<PositionUpdate>> {
    resolve_group(store, group, principal)?;
    let current = store.sibling_ids(group)?;
    validate_membership(group, &current, proposed).map_err(BoardError::InvalidMembership)?;
    Ok(store.commit_order(group, proposed)?)
}
