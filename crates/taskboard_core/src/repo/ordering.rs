//! Sibling ordering persistence shared by lists and cards.
//!
//! # Responsibility
//! - Read and write child `position` columns for one sibling group.
//! - Keep the parent-held ordering array (`boards.list_order`,
//!   `lists.card_order`) in the same order as the committed positions.
//!
//! # Invariants
//! - Stored order is `position ASC, created_at ASC, rowid ASC`; the tie-breakers
//!   only matter while a non-shifting insert has left a duplicate position.
//! - `commit_order` re-checks membership inside its transaction and writes
//!   nothing when the stored children differ from the proposed order.

use super::{decode_id_array, encode_id_array, parse_uuid, RepoError, RepoResult, SqliteBoardStore};
use crate::position::{pending_updates, recompute_positions, PositionUpdate, SiblingGroup};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use uuid::Uuid;

/// Repository interface for sibling ordering.
pub trait OrderingRepository {
    /// Child ids of the group in stored order.
    fn sibling_ids(&self, group: SiblingGroup) -> RepoResult<Vec<Uuid>>;
    /// Parent-held ordering array of the group.
    fn order_array(&self, group: SiblingGroup) -> RepoResult<Vec<Uuid>>;
    /// Atomically commits `ordered` as the complete order of the group.
    fn commit_order(
        &self,
        group: SiblingGroup,
        ordered: &[Uuid],
    ) -> RepoResult<Vec<PositionUpdate>>;
}

impl OrderingRepository for SqliteBoardStore<'_> {
    fn sibling_ids(&self, group: SiblingGroup) -> RepoResult<Vec<Uuid>> {
        Ok(load_sibling_positions(self.conn(), group)?
            .into_iter()
            .map(|entry| entry.id)
            .collect())
    }

    fn order_array(&self, group: SiblingGroup) -> RepoResult<Vec<Uuid>> {
        load_order_array(self.conn(), group)
    }

    fn commit_order(
        &self,
        group: SiblingGroup,
        ordered: &[Uuid],
    ) -> RepoResult<Vec<PositionUpdate>> {
        let tx = self.begin_write()?;
        load_order_array(&tx, group)?;

        let current: Vec<Uuid> = load_sibling_positions(&tx, group)?
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        if !same_members(&current, ordered) {
            return Err(RepoError::StaleMembership(group));
        }

        let plan = recompute_positions(ordered);
        write_positions(&tx, group, &plan)?;
        store_order_array(&tx, group, ordered)?;
        tx.commit()?;
        Ok(plan)
    }
}

struct GroupTables {
    child_table: &'static str,
    parent_column: &'static str,
    parent_table: &'static str,
    order_column: &'static str,
}

fn group_tables(group: SiblingGroup) -> GroupTables {
    match group {
        SiblingGroup::ListsOfBoard(_) => GroupTables {
            child_table: "lists",
            parent_column: "board_id",
            parent_table: "boards",
            order_column: "list_order",
        },
        SiblingGroup::CardsOfList(_) => GroupTables {
            child_table: "cards",
            parent_column: "list_id",
            parent_table: "lists",
            order_column: "card_order",
        },
    }
}

/// Loads the parent ordering array; `NotFound` when the parent is gone.
pub(crate) fn load_order_array(conn: &Connection, group: SiblingGroup) -> RepoResult<Vec<Uuid>> {
    let tables = group_tables(group);
    let raw: Option<String> = conn
        .query_row(
            &format!(
                "SELECT {order} FROM {parent} WHERE id = ?1;",
                order = tables.order_column,
                parent = tables.parent_table
            ),
            [group.parent_id().to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        Some(raw) => decode_id_array(&raw, tables.order_column),
        None => Err(RepoError::not_found(group.parent_kind(), group.parent_id())),
    }
}

/// Overwrites the parent ordering array and bumps the parent `updated_at`.
pub(crate) fn store_order_array(
    conn: &Connection,
    group: SiblingGroup,
    ids: &[Uuid],
) -> RepoResult<()> {
    let tables = group_tables(group);
    let changed = conn.execute(
        &format!(
            "UPDATE {parent}
             SET {order} = ?2,
                 updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            parent = tables.parent_table,
            order = tables.order_column
        ),
        params![group.parent_id().to_string(), encode_id_array(ids)?],
    )?;
    if changed == 0 {
        return Err(RepoError::not_found(group.parent_kind(), group.parent_id()));
    }
    Ok(())
}

pub(crate) fn load_sibling_positions(
    conn: &Connection,
    group: SiblingGroup,
) -> RepoResult<Vec<PositionUpdate>> {
    let tables = group_tables(group);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, position
         FROM {child}
         WHERE {parent_column} = ?1
         ORDER BY position ASC, created_at ASC, rowid ASC;",
        child = tables.child_table,
        parent_column = tables.parent_column
    ))?;
    let mut rows = stmt.query([group.parent_id().to_string()])?;
    let mut siblings = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get(0)?;
        siblings.push(PositionUpdate {
            id: parse_uuid(&id_text, "sibling id")?,
            position: row.get(1)?,
        });
    }
    Ok(siblings)
}

pub(crate) fn write_positions(
    conn: &Connection,
    group: SiblingGroup,
    updates: &[PositionUpdate],
) -> RepoResult<()> {
    if updates.is_empty() {
        return Ok(());
    }
    let tables = group_tables(group);
    let mut stmt = conn.prepare(&format!(
        "UPDATE {child}
         SET position = ?2,
             updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
         WHERE id = ?1
           AND {parent_column} = ?3;",
        child = tables.child_table,
        parent_column = tables.parent_column
    ))?;
    let parent_id = group.parent_id().to_string();
    for update in updates {
        let changed = stmt.execute(params![
            update.id.to_string(),
            update.position,
            parent_id.as_str()
        ])?;
        if changed == 0 {
            return Err(RepoError::StaleMembership(group));
        }
    }
    Ok(())
}

/// Densifies positions in stored order and realigns the parent array.
///
/// Must run inside the caller's transaction.
pub(crate) fn recompute_in_tx(
    conn: &Connection,
    group: SiblingGroup,
) -> RepoResult<Vec<PositionUpdate>> {
    let siblings = load_sibling_positions(conn, group)?;
    write_positions(conn, group, &pending_updates(&siblings))?;

    let ordered: Vec<Uuid> = siblings.iter().map(|entry| entry.id).collect();
    store_order_array(conn, group, &ordered)?;
    Ok(recompute_positions(&ordered))
}

fn same_members(current: &[Uuid], proposed: &[Uuid]) -> bool {
    if current.len() != proposed.len() {
        return false;
    }
    let current: HashSet<&Uuid> = current.iter().collect();
    let proposed_set: HashSet<&Uuid> = proposed.iter().collect();
    proposed_set.len() == proposed.len() && current == proposed_set
}
