//! List repository contract and SQLite implementation.
//!
//! # Invariants
//! - Create appends the new id to `boards.list_order` in the same
//!   transaction as the row insert.
//! - Delete removes the id from the board array, deletes the list's cards and
//!   their comments, then densifies the remaining list positions, all in one
//!   transaction.

use super::ordering::{load_order_array, recompute_in_tx, store_order_array};
use super::{decode_id_array, parse_uuid, RepoError, RepoResult, SqliteBoardStore};
use crate::model::board::BoardId;
use crate::model::list::{List, ListId, ListPatch, NewList};
use crate::model::EntityKind;
use crate::position::{assign_position, PositionUpdate, SiblingGroup};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use uuid::Uuid;

const LIST_SELECT_SQL: &str = "SELECT
    id,
    board_id,
    title,
    position,
    card_order,
    created_at,
    updated_at
FROM lists";

/// Outcome of a cascading list delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListDeletion {
    pub board_id: BoardId,
    pub cards_removed: usize,
    /// Dense positions of the remaining lists of the board.
    pub positions: Vec<PositionUpdate>,
}

/// Repository interface for lists.
pub trait ListRepository {
    /// Inserts a normalized list under an existing board.
    fn insert_list(&self, board_id: BoardId, list: &NewList) -> RepoResult<List>;
    fn get_list(&self, id: ListId) -> RepoResult<Option<List>>;
    /// Lists of a board in stored order.
    fn list_lists(&self, board_id: BoardId) -> RepoResult<Vec<List>>;
    /// Applies a validated patch. Does not shift siblings.
    fn update_list(&self, id: ListId, patch: &ListPatch) -> RepoResult<List>;
    fn delete_list_cascade(&self, id: ListId) -> RepoResult<ListDeletion>;
}

impl ListRepository for SqliteBoardStore<'_> {
    fn insert_list(&self, board_id: BoardId, list: &NewList) -> RepoResult<List> {
        let group = SiblingGroup::ListsOfBoard(board_id);
        let tx = self.begin_write()?;
        let mut order = load_order_array(&tx, group)?;
        let position = assign_position(&order, list.position);

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO lists (id, board_id, title, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                board_id.to_string(),
                list.title.as_str(),
                position
            ],
        )?;
        order.push(id);
        store_order_array(&tx, group, &order)?;

        let created = load_required_list(&tx, id)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<List>> {
        load_list(self.conn(), id)
    }

    fn list_lists(&self, board_id: BoardId) -> RepoResult<Vec<List>> {
        let mut stmt = self.conn().prepare(&format!(
            "{LIST_SELECT_SQL}
             WHERE board_id = ?1
             ORDER BY position ASC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(parse_list_row(row)?);
        }
        Ok(lists)
    }

    fn update_list(&self, id: ListId, patch: &ListPatch) -> RepoResult<List> {
        let changed = self.conn().execute(
            "UPDATE lists
             SET title = COALESCE(?2, title),
                 position = COALESCE(?3, position),
                 updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![id.to_string(), patch.title.as_deref(), patch.position],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::List, id));
        }
        load_required_list(self.conn(), id)
    }

    fn delete_list_cascade(&self, id: ListId) -> RepoResult<ListDeletion> {
        let tx = self.begin_write()?;
        let list = load_required_list(&tx, id)?;
        let group = SiblingGroup::ListsOfBoard(list.board_id);

        let mut order = load_order_array(&tx, group)?;
        order.retain(|list_id| *list_id != id);
        store_order_array(&tx, group, &order)?;

        let list_id = id.to_string();
        tx.execute(
            "DELETE FROM card_comments
             WHERE card_id IN (SELECT id FROM cards WHERE list_id = ?1);",
            [list_id.as_str()],
        )?;
        let cards_removed = tx.execute("DELETE FROM cards WHERE list_id = ?1;", [list_id.as_str()])?;
        tx.execute("DELETE FROM lists WHERE id = ?1;", [list_id.as_str()])?;

        let positions = recompute_in_tx(&tx, group)?;
        tx.commit()?;
        Ok(ListDeletion {
            board_id: list.board_id,
            cards_removed,
            positions,
        })
    }
}

fn load_list(conn: &Connection, id: ListId) -> RepoResult<Option<List>> {
    let mut stmt = conn.prepare(&format!("{LIST_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_list_row(row)?));
    }
    Ok(None)
}

fn load_required_list(conn: &Connection, id: ListId) -> RepoResult<List> {
    load_list(conn, id)?.ok_or(RepoError::not_found(EntityKind::List, id))
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<List> {
    let id_text: String = row.get("id")?;
    let board_text: String = row.get("board_id")?;
    let card_order: String = row.get("card_order")?;
    Ok(List {
        id: parse_uuid(&id_text, "lists.id")?,
        board_id: parse_uuid(&board_text, "lists.board_id")?,
        title: row.get("title")?,
        position: row.get("position")?,
        card_ids: decode_id_array(&card_order, "lists.card_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
