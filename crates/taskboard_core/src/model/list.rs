//! List domain model.
//!
//! # Invariants
//! - `position` is dense (`0..n-1`) among lists of one board after every
//!   committed delete or reorder.
//! - `card_ids` holds the same id set as the cards whose `list_id` points at
//!   this list.

use super::board::BoardId;
use super::card::CardId;
use super::{check_position, required_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ListId = Uuid;

pub const LIST_TITLE_MAX_CHARS: usize = 100;

/// List read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub title: String,
    pub position: i64,
    /// Parent-held card ordering.
    pub card_ids: Vec<CardId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// List creation input.
///
/// An explicit `position` is stored as given and does not shift siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewList {
    pub title: String,
    pub position: Option<i64>,
}

impl NewList {
    pub fn normalized(&self) -> Result<NewList, ValidationError> {
        Ok(NewList {
            title: required_text("title", &self.title, LIST_TITLE_MAX_CHARS)?,
            position: check_position(self.position)?,
        })
    }
}

/// Allow-listed list update: `title`, `position`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListPatch {
    pub title: Option<String>,
    pub position: Option<i64>,
}

impl ListPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.position.is_none()
    }

    /// Validates present fields into a normalized patch.
    pub fn validate(&self) -> Result<ListPatch, ValidationError> {
        Ok(ListPatch {
            title: self
                .title
                .as_deref()
                .map(|value| required_text("title", value, LIST_TITLE_MAX_CHARS))
                .transpose()?,
            position: check_position(self.position)?,
        })
    }
}
