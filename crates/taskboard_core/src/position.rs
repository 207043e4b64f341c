//! Dense sibling positions.
//!
//! # Responsibility
//! - Pick the position of a newly inserted sibling.
//! - Reassign dense zero-based positions to an ordered sibling sequence.
//!
//! # Invariants
//! - Pure functions only; callers own persistence and transactions.
//! - `recompute_positions` maps the i-th id to position `i`.
//! - Inserts never shift existing siblings. An explicit insert position may
//!   collide with a sibling until the next reorder or delete recompute.

use crate::model::board::BoardId;
use crate::model::list::ListId;
use crate::model::EntityKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One sibling's committed or planned position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: Uuid,
    pub position: i64,
}

/// A parent together with the kind of children it orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiblingGroup {
    /// Lists of one board, mirrored by `boards.list_order`.
    ListsOfBoard(BoardId),
    /// Cards of one list, mirrored by `lists.card_order`.
    CardsOfList(ListId),
}

impl SiblingGroup {
    pub fn parent_id(self) -> Uuid {
        match self {
            Self::ListsOfBoard(id) | Self::CardsOfList(id) => id,
        }
    }

    pub fn parent_kind(self) -> EntityKind {
        match self {
            Self::ListsOfBoard(_) => EntityKind::Board,
            Self::CardsOfList(_) => EntityKind::List,
        }
    }

    pub fn child_kind(self) -> EntityKind {
        match self {
            Self::ListsOfBoard(_) => EntityKind::List,
            Self::CardsOfList(_) => EntityKind::Card,
        }
    }
}

/// Position for a new sibling: the requested one, or append at the end.
pub fn assign_position(existing_siblings: &[Uuid], requested: Option<i64>) -> i64 {
    requested.unwrap_or(existing_siblings.len() as i64)
}

/// Maps each id, in the given order, to positions `0..n-1`.
pub fn recompute_positions(siblings_in_order: &[Uuid]) -> Vec<PositionUpdate> {
    siblings_in_order
        .iter()
        .enumerate()
        .map(|(index, id)| PositionUpdate {
            id: *id,
            position: index as i64,
        })
        .collect()
}

/// Returns only the entries whose stored position differs from its dense
/// index. Empty when `current` is already dense.
pub fn pending_updates(current: &[PositionUpdate]) -> Vec<PositionUpdate> {
    current
        .iter()
        .enumerate()
        .filter(|(index, entry)| entry.position != *index as i64)
        .map(|(index, entry)| PositionUpdate {
            id: entry.id,
            position: index as i64,
        })
        .collect()
}

/// Whether the positions form exactly `{0, .., n-1}`.
pub fn is_dense(positions: impl IntoIterator<Item = i64>) -> bool {
    let mut sorted: Vec<i64> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as i64)
}
