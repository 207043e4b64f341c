//! Ownership chain resolution.
//!
//! # Responsibility
//! - Walk comment -> card -> list -> board -> owner for any entity kind.
//! - Turn a broken chain into `NotFound` and a foreign owner into `Forbidden`.
//!
//! # Invariants
//! - Read-only. Every mutating service call resolves its target or parent
//!   here before writing anything.

use super::error::{BoardError, BoardResult};
use crate::model::board::{Board, BoardId};
use crate::model::card::{Card, CardId, Comment};
use crate::model::list::{List, ListId};
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::position::SiblingGroup;
use crate::repo::{BoardStore, RepoResult};
use uuid::Uuid;

/// Next link up the ownership chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Owner(UserId),
    Board(BoardId),
    List(ListId),
    Card(CardId),
}

/// Entity that can be authorized through the ownership chain.
pub trait Owned: Sized {
    const KIND: EntityKind;

    fn load<S: BoardStore + ?Sized>(store: &S, id: Uuid) -> RepoResult<Option<Self>>;

    fn parent(&self) -> Link;
}

impl Owned for Board {
    const KIND: EntityKind = EntityKind::Board;

    fn load<S: BoardStore + ?Sized>(store: &S, id: Uuid) -> RepoResult<Option<Self>> {
        store.get_board(id)
    }

    fn parent(&self) -> Link {
        Link::Owner(self.owner_id)
    }
}

impl Owned for List {
    const KIND: EntityKind = EntityKind::List;

    fn load<S: BoardStore + ?Sized>(store: &S, id: Uuid) -> RepoResult<Option<Self>> {
        store.get_list(id)
    }

    fn parent(&self) -> Link {
        Link::Board(self.board_id)
    }
}

impl Owned for Card {
    const KIND: EntityKind = EntityKind::Card;

    fn load<S: BoardStore + ?Sized>(store: &S, id: Uuid) -> RepoResult<Option<Self>> {
        store.get_card(id)
    }

    fn parent(&self) -> Link {
        Link::List(self.list_id)
    }
}

impl Owned for Comment {
    const KIND: EntityKind = EntityKind::Comment;

    fn load<S: BoardStore + ?Sized>(store: &S, id: Uuid) -> RepoResult<Option<Self>> {
        store.get_comment(id)
    }

    fn parent(&self) -> Link {
        Link::Card(self.card_id)
    }
}

/// Loads `T` by id and checks that its chain ends at `principal`.
pub fn resolve_ownership<T, S>(store: &S, id: Uuid, principal: UserId) -> BoardResult<T>
where
    T: Owned,
    S: BoardStore + ?Sized,
{
    let entity = load_required::<T, S>(store, id)?;
    if owner_of(store, entity.parent())? != principal {
        return Err(BoardError::Forbidden { kind: T::KIND, id });
    }
    Ok(entity)
}

/// Authorizes access to the parent of a sibling group.
pub fn resolve_group<S: BoardStore + ?Sized>(
    store: &S,
    group: SiblingGroup,
    principal: UserId,
) -> BoardResult<()> {
    match group {
        SiblingGroup::ListsOfBoard(board_id) => {
            resolve_ownership::<Board, S>(store, board_id, principal).map(|_| ())
        }
        SiblingGroup::CardsOfList(list_id) => {
            resolve_ownership::<List, S>(store, list_id, principal).map(|_| ())
        }
    }
}

fn owner_of<S: BoardStore + ?Sized>(store: &S, mut link: Link) -> BoardResult<UserId> {
    loop {
        link = match link {
            Link::Owner(owner) => return Ok(owner),
            Link::Board(id) => load_required::<Board, S>(store, id)?.parent(),
            Link::List(id) => load_required::<List, S>(store, id)?.parent(),
            Link::Card(id) => load_required::<Card, S>(store, id)?.parent(),
        };
    }
}

fn load_required<T: Owned, S: BoardStore + ?Sized>(store: &S, id: Uuid) -> BoardResult<T> {
    T::load(store, id)?.ok_or(BoardError::not_found(T::KIND, id))
}
