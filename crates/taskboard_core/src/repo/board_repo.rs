//! Board repository contract and SQLite implementation.
//!
//! # Invariants
//! - Owner listing is deterministic: `updated_at DESC, created_at DESC, rowid DESC`.
//! - Board delete removes comments, cards and lists of the board in the same
//!   transaction before removing the board row.

use super::{decode_id_array, parse_uuid, RepoError, RepoResult, SqliteBoardStore};
use crate::model::board::{Board, BoardChanges, BoardId, NewBoard, DEFAULT_BACKGROUND_COLOR};
use crate::model::user::UserId;
use crate::model::EntityKind;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use uuid::Uuid;

const BOARD_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    description,
    background_color,
    list_order,
    created_at,
    updated_at
FROM boards";

/// Row counts removed by a cascading board delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeSummary {
    pub lists: usize,
    pub cards: usize,
    pub comments: usize,
}

/// Repository interface for boards.
pub trait BoardRepository {
    fn insert_board(&self, owner_id: UserId, board: &NewBoard) -> RepoResult<Board>;
    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>>;
    fn list_boards_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<Board>>;
    fn update_board(&self, id: BoardId, changes: &BoardChanges) -> RepoResult<Board>;
    /// Deletes the board and everything below it.
    fn delete_board_cascade(&self, id: BoardId) -> RepoResult<CascadeSummary>;
}

impl BoardRepository for SqliteBoardStore<'_> {
    fn insert_board(&self, owner_id: UserId, board: &NewBoard) -> RepoResult<Board> {
        let id = Uuid::new_v4();
        self.conn().execute(
            "INSERT INTO boards (id, owner_id, title, description, background_color)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                owner_id.to_string(),
                board.title.as_str(),
                board.description.as_deref(),
                board
                    .background_color
                    .as_deref()
                    .unwrap_or(DEFAULT_BACKGROUND_COLOR),
            ],
        )?;
        load_required_board(self.conn(), id)
    }

    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>> {
        load_board(self.conn(), id)
    }

    fn list_boards_for_owner(&self, owner_id: UserId) -> RepoResult<Vec<Board>> {
        let mut stmt = self.conn().prepare(&format!(
            "{BOARD_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY updated_at DESC, created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            boards.push(parse_board_row(row)?);
        }
        Ok(boards)
    }

    fn update_board(&self, id: BoardId, changes: &BoardChanges) -> RepoResult<Board> {
        let changed = self.conn().execute(
            "UPDATE boards
             SET title = COALESCE(?2, title),
                 description = CASE WHEN ?3 = 1 THEN ?4 ELSE description END,
                 background_color = COALESCE(?5, background_color),
                 updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![
                id.to_string(),
                changes.title.as_deref(),
                changes.description.is_some(),
                changes.description.clone().flatten(),
                changes.background_color.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Board, id));
        }
        load_required_board(self.conn(), id)
    }

    fn delete_board_cascade(&self, id: BoardId) -> RepoResult<CascadeSummary> {
        let tx = self.begin_write()?;
        load_required_board(&tx, id)?;
        let board_id = id.to_string();

        let comments = tx.execute(
            "DELETE FROM card_comments
             WHERE card_id IN (
                SELECT c.id
                FROM cards c
                INNER JOIN lists l ON l.id = c.list_id
                WHERE l.board_id = ?1
             );",
            [board_id.as_str()],
        )?;
        let cards = tx.execute(
            "DELETE FROM cards
             WHERE list_id IN (SELECT id FROM lists WHERE board_id = ?1);",
            [board_id.as_str()],
        )?;
        let lists = tx.execute("DELETE FROM lists WHERE board_id = ?1;", [board_id.as_str()])?;
        tx.execute("DELETE FROM boards WHERE id = ?1;", [board_id.as_str()])?;

        tx.commit()?;
        Ok(CascadeSummary {
            lists,
            cards,
            comments,
        })
    }
}

fn load_board(conn: &Connection, id: BoardId) -> RepoResult<Option<Board>> {
    let mut stmt = conn.prepare(&format!("{BOARD_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_board_row(row)?));
    }
    Ok(None)
}

fn load_required_board(conn: &Connection, id: BoardId) -> RepoResult<Board> {
    load_board(conn, id)?.ok_or(RepoError::not_found(EntityKind::Board, id))
}

fn parse_board_row(row: &Row<'_>) -> RepoResult<Board> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    let list_order: String = row.get("list_order")?;
    Ok(Board {
        id: parse_uuid(&id_text, "boards.id")?,
        owner_id: parse_uuid(&owner_text, "boards.owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        background_color: row.get("background_color")?,
        list_ids: decode_id_array(&list_order, "boards.list_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
