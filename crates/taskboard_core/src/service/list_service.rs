//! List use-cases.
//!
//! # Invariants
//! - Create appends to the board ordering array unless an explicit position
//!   is given; an explicit position is stored as-is and never shifts
//!   siblings. Follow it with `reorder_lists` to restore density.
//! - Delete cascades to the list's cards and recomputes sibling positions.

use super::error::{BoardError, BoardResult};
use super::observe;
use super::ownership::resolve_ownership;
use super::reorder::reorder;
use crate::model::board::{Board, BoardId};
use crate::model::list::{List, ListId, ListPatch, NewList};
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::position::{PositionUpdate, SiblingGroup};
use crate::repo::list_repo::ListDeletion;
use crate::repo::BoardStore;

/// List service facade over a board store.
pub struct ListService<S: BoardStore> {
    store: S,
}

impl<S: BoardStore> ListService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_list(
        &self,
        principal: UserId,
        board_id: BoardId,
        input: &NewList,
    ) -> BoardResult<List> {
        observe(
            "list_create",
            self.create_list_inner(principal, board_id, input),
        )
    }

    fn create_list_inner(
        &self,
        principal: UserId,
        board_id: BoardId,
        input: &NewList,
    ) -> BoardResult<List> {
        let list = input.normalized()?;
        resolve_ownership::<Board, S>(&self.store, board_id, principal)?;
        Ok(self.store.insert_list(board_id, &list)?)
    }

    pub fn get_list(&self, principal: UserId, id: ListId) -> BoardResult<List> {
        resolve_ownership::<List, S>(&self.store, id, principal)
    }

    /// Lists of a board sorted by position.
    pub fn list_lists(&self, principal: UserId, board_id: BoardId) -> BoardResult<Vec<List>> {
        resolve_ownership::<Board, S>(&self.store, board_id, principal)?;
        Ok(self.store.list_lists(board_id)?)
    }

    /// Applies the allow-listed `title` and `position`.
    pub fn update_list(
        &self,
        principal: UserId,
        id: ListId,
        patch: &ListPatch,
    ) -> BoardResult<List> {
        observe("list_update", self.update_list_inner(principal, id, patch))
    }

    fn update_list_inner(
        &self,
        principal: UserId,
        id: ListId,
        patch: &ListPatch,
    ) -> BoardResult<List> {
        if patch.is_empty() {
            return Err(BoardError::NoFieldsToUpdate(EntityKind::List));
        }
        let patch = patch.validate()?;
        resolve_ownership::<List, S>(&self.store, id, principal)?;
        Ok(self.store.update_list(id, &patch)?)
    }

    pub fn delete_list(&self, principal: UserId, id: ListId) -> BoardResult<ListDeletion> {
        observe("list_delete", self.delete_list_inner(principal, id))
    }

    fn delete_list_inner(&self, principal: UserId, id: ListId) -> BoardResult<ListDeletion> {
        resolve_ownership::<List, S>(&self.store, id, principal)?;
        Ok(self.store.delete_list_cascade(id)?)
    }

    /// Replaces the full list order of a board.
    pub fn reorder_lists(
        &self,
        principal: UserId,
        board_id: BoardId,
        ordered: &[ListId],
    ) -> BoardResult<Vec<PositionUpdate>> {
        observe(
            "list_reorder",
            reorder(
                &self.store,
                SiblingGroup::ListsOfBoard(board_id),
                ordered,
                principal,
            ),
        )
    }
}
