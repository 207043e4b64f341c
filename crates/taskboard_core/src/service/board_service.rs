//! Board use-cases.
//!
//! # Invariants
//! - Board reads and writes other than create/list require the principal to
//!   own the board.
//! - Delete cascades to lists, cards and comments in one transaction.

use super::error::{BoardError, BoardResult};
use super::observe;
use super::ownership::resolve_ownership;
use crate::model::board::{Board, BoardId, BoardPatch, NewBoard};
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::repo::board_repo::CascadeSummary;
use crate::repo::BoardStore;

/// Board service facade over a board store.
pub struct BoardService<S: BoardStore> {
    store: S,
}

impl<S: BoardStore> BoardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_board(&self, principal: UserId, input: &NewBoard) -> BoardResult<Board> {
        observe("board_create", self.create_board_inner(principal, input))
    }

    fn create_board_inner(&self, principal: UserId, input: &NewBoard) -> BoardResult<Board> {
        let board = input.normalized()?;
        if self.store.get_user(principal)?.is_none() {
            return Err(BoardError::not_found(EntityKind::User, principal));
        }
        Ok(self.store.insert_board(principal, &board)?)
    }

    /// Boards owned by the principal, most recently updated first.
    pub fn list_my_boards(&self, principal: UserId) -> BoardResult<Vec<Board>> {
        Ok(self.store.list_boards_for_owner(principal)?)
    }

    pub fn get_board(&self, principal: UserId, id: BoardId) -> BoardResult<Board> {
        resolve_ownership::<Board, S>(&self.store, id, principal)
    }

    /// Applies the allow-listed `title`, `description`, `background_color`.
    pub fn update_board(
        &self,
        principal: UserId,
        id: BoardId,
        patch: &BoardPatch,
    ) -> BoardResult<Board> {
        observe("board_update", self.update_board_inner(principal, id, patch))
    }

    fn update_board_inner(
        &self,
        principal: UserId,
        id: BoardId,
        patch: &BoardPatch,
    ) -> BoardResult<Board> {
        if patch.is_empty() {
            return Err(BoardError::NoFieldsToUpdate(EntityKind::Board));
        }
        let changes = patch.validate()?;
        resolve_ownership::<Board, S>(&self.store, id, principal)?;
        Ok(self.store.update_board(id, &changes)?)
    }

    pub fn delete_board(&self, principal: UserId, id: BoardId) -> BoardResult<CascadeSummary> {
        observe("board_delete", self.delete_board_inner(principal, id))
    }

    fn delete_board_inner(&self, principal: UserId, id: BoardId) -> BoardResult<CascadeSummary> {
        resolve_ownership::<Board, S>(&self.store, id, principal)?;
        Ok(self.store.delete_board_cascade(id)?)
    }
}
