//! Board domain model.
//!
//! # Invariants
//! - A board is owned by exactly one user.
//! - `list_ids` holds the same id set as the lists whose `board_id` points
//!   at this board.

use super::list::ListId;
use super::user::UserId;
use super::{optional_text, required_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BoardId = Uuid;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#0079bf";
pub const BOARD_TITLE_MAX_CHARS: usize = 100;
pub const BOARD_DESCRIPTION_MAX_CHARS: usize = 500;
pub const BACKGROUND_COLOR_MAX_CHARS: usize = 32;

/// Board read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub background_color: String,
    /// Parent-held list ordering.
    pub list_ids: Vec<ListId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Board creation input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewBoard {
    pub title: String,
    pub description: Option<String>,
    pub background_color: Option<String>,
}

impl NewBoard {
    /// Returns a normalized copy with the default background applied.
    pub fn normalized(&self) -> Result<NewBoard, ValidationError> {
        let background_color = optional_text(
            "background_color",
            self.background_color.as_deref(),
            BACKGROUND_COLOR_MAX_CHARS,
        )?
        .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string());

        Ok(NewBoard {
            title: required_text("title", &self.title, BOARD_TITLE_MAX_CHARS)?,
            description: optional_text(
                "description",
                self.description.as_deref(),
                BOARD_DESCRIPTION_MAX_CHARS,
            )?,
            background_color: Some(background_color),
        })
    }
}

/// Allow-listed board update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardPatch {
    pub title: Option<String>,
    /// Blank text clears the description.
    pub description: Option<String>,
    pub background_color: Option<String>,
}

/// Validated board changes handed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub background_color: Option<String>,
}

impl BoardPatch {
    /// Whether no allow-listed field is present.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.background_color.is_none()
    }

    /// Validates present fields.
    pub fn validate(&self) -> Result<BoardChanges, ValidationError> {
        let title = self
            .title
            .as_deref()
            .map(|value| required_text("title", value, BOARD_TITLE_MAX_CHARS))
            .transpose()?;
        let description = self
            .description
            .as_deref()
            .map(|value| optional_text("description", Some(value), BOARD_DESCRIPTION_MAX_CHARS))
            .transpose()?;
        let background_color = self
            .background_color
            .as_deref()
            .map(|value| required_text("background_color", value, BACKGROUND_COLOR_MAX_CHARS))
            .transpose()?;
        Ok(BoardChanges {
            title,
            description,
            background_color,
        })
    }
}
