//! Card and comment use-cases.
//!
//! # Invariants
//! - Every card operation resolves the card or its list to the principal
//!   before touching storage.
//! - Comments are append-only; delete-by-id fails with `NotFound` when the
//!   id is not on the card.

use super::error::{BoardError, BoardResult};
use super::observe;
use super::ownership::resolve_ownership;
use super::reorder::reorder;
use crate::model::card::{
    normalize_comment_text, Card, CardId, CardPatch, Comment, CommentId, NewCard, TaskCard,
};
use crate::model::list::{List, ListId};
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::position::{PositionUpdate, SiblingGroup};
use crate::repo::card_repo::CardDeletion;
use crate::repo::BoardStore;

/// Card service facade over a board store.
pub struct CardService<S: BoardStore> {
    store: S,
}

impl<S: BoardStore> CardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a card at the end of the list, or at the explicit position
    /// without shifting siblings.
    pub fn create_card(
        &self,
        principal: UserId,
        list_id: ListId,
        input: &NewCard,
    ) -> BoardResult<Card> {
        observe(
            "card_create",
            self.create_card_inner(principal, list_id, input),
        )
    }

    fn create_card_inner(
        &self,
        principal: UserId,
        list_id: ListId,
        input: &NewCard,
    ) -> BoardResult<Card> {
        let fields = input.validate()?;
        resolve_ownership::<List, S>(&self.store, list_id, principal)?;
        Ok(self.store.insert_card(list_id, &fields)?)
    }

    pub fn get_card(&self, principal: UserId, id: CardId) -> BoardResult<Card> {
        resolve_ownership::<Card, S>(&self.store, id, principal)
    }

    /// Cards of a list sorted by position.
    pub fn list_cards(&self, principal: UserId, list_id: ListId) -> BoardResult<Vec<Card>> {
        resolve_ownership::<List, S>(&self.store, list_id, principal)?;
        Ok(self.store.list_cards(list_id)?)
    }

    /// Every card on the principal's boards, by due date then newest.
    pub fn list_my_cards(&self, principal: UserId) -> BoardResult<Vec<TaskCard>> {
        Ok(self.store.list_cards_for_owner(principal)?)
    }

    /// Applies the allow-listed `title`, `description`, `position`, `labels`
    /// and `due_date`.
    pub fn update_card(
        &self,
        principal: UserId,
        id: CardId,
        patch: &CardPatch,
    ) -> BoardResult<Card> {
        observe("card_update", self.update_card_inner(principal, id, patch))
    }

    fn update_card_inner(
        &self,
        principal: UserId,
        id: CardId,
        patch: &CardPatch,
    ) -> BoardResult<Card> {
        if patch.is_empty() {
            return Err(BoardError::NoFieldsToUpdate(EntityKind::Card));
        }
        let changes = patch.validate()?;
        resolve_ownership::<Card, S>(&self.store, id, principal)?;
        Ok(self.store.update_card(id, &changes)?)
    }

    pub fn delete_card(&self, principal: UserId, id: CardId) -> BoardResult<CardDeletion> {
        observe("card_delete", self.delete_card_inner(principal, id))
    }

    fn delete_card_inner(&self, principal: UserId, id: CardId) -> BoardResult<CardDeletion> {
        resolve_ownership::<Card, S>(&self.store, id, principal)?;
        Ok(self.store.delete_card(id)?)
    }

    /// Replaces the full card order of a list.
    pub fn reorder_cards(
        &self,
        principal: UserId,
        list_id: ListId,
        ordered: &[CardId],
    ) -> BoardResult<Vec<PositionUpdate>> {
        observe(
            "card_reorder",
            reorder(
                &self.store,
                SiblingGroup::CardsOfList(list_id),
                ordered,
                principal,
            ),
        )
    }

    /// Appends a comment authored by the principal.
    pub fn add_comment(
        &self,
        principal: UserId,
        card_id: CardId,
        text: &str,
    ) -> BoardResult<Comment> {
        observe(
            "comment_add",
            self.add_comment_inner(principal, card_id, text),
        )
    }

    fn add_comment_inner(
        &self,
        principal: UserId,
        card_id: CardId,
        text: &str,
    ) -> BoardResult<Comment> {
        let text = normalize_comment_text(text)?;
        resolve_ownership::<Card, S>(&self.store, card_id, principal)?;
        Ok(self.store.insert_comment(card_id, principal, &text)?)
    }

    pub fn get_comment(&self, principal: UserId, id: CommentId) -> BoardResult<Comment> {
        resolve_ownership::<Comment, S>(&self.store, id, principal)
    }

    pub fn delete_comment(
        &self,
        principal: UserId,
        card_id: CardId,
        comment_id: CommentId,
    ) -> BoardResult<()> {
        observe(
            "comment_delete",
            self.delete_comment_inner(principal, card_id, comment_id),
        )
    }

    fn delete_comment_inner(
        &self,
        principal: UserId,
        card_id: CardId,
        comment_id: CommentId,
    ) -> BoardResult<()> {
        resolve_ownership::<Card, S>(&self.store, card_id, principal)?;
        Ok(self.store.delete_comment(card_id, comment_id)?)
    }
}
