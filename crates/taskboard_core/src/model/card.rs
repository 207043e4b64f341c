//! Card and comment domain model.
//!
//! # Invariants
//! - `position` is dense (`0..n-1`) among cards of one list after every
//!   committed delete or reorder.
//! - Comments are append-only; removal is by explicit id.
//! - `due_date` is stored as epoch milliseconds (UTC).

use super::list::ListId;
use super::user::UserId;
use super::{check_position, explicit_null, optional_text, required_text, ValidationError};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CardId = Uuid;
pub type CommentId = Uuid;

pub const CARD_TITLE_MAX_CHARS: usize = 200;
pub const CARD_DESCRIPTION_MAX_CHARS: usize = 2000;
pub const CARD_LABEL_MAX_CHARS: usize = 50;
pub const COMMENT_TEXT_MAX_CHARS: usize = 2000;

/// Comment read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub card_id: CardId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: i64,
}

/// Card read model. `comments` are in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    pub title: String,
    pub description: Option<String>,
    pub position: i64,
    pub labels: Vec<String>,
    pub due_date: Option<i64>,
    pub comments: Vec<Comment>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Card annotated with its parents, used by the cross-board task view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCard {
    pub card: Card,
    pub list_title: String,
    pub board_id: Uuid,
    pub board_title: String,
}

/// Card creation input.
///
/// An explicit `position` is stored as given and does not shift siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i64>,
    pub labels: Vec<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub due_date: Option<String>,
}

/// Validated card creation fields handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i64>,
    pub labels: Vec<String>,
    pub due_date: Option<i64>,
}

impl NewCard {
    pub fn validate(&self) -> Result<CardFields, ValidationError> {
        Ok(CardFields {
            title: required_text("title", &self.title, CARD_TITLE_MAX_CHARS)?,
            description: optional_text(
                "description",
                self.description.as_deref(),
                CARD_DESCRIPTION_MAX_CHARS,
            )?,
            position: check_position(self.position)?,
            labels: normalize_labels(&self.labels)?,
            due_date: self.due_date.as_deref().map(parse_due_date).transpose()?,
        })
    }
}

/// Allow-listed card update: `title`, `description`, `position`, `labels`,
/// `due_date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CardPatch {
    pub title: Option<String>,
    /// Blank text clears the description.
    pub description: Option<String>,
    pub position: Option<i64>,
    pub labels: Option<Vec<String>>,
    /// `Some(None)` (explicit `null`) clears the due date.
    #[serde(default, deserialize_with = "explicit_null")]
    pub due_date: Option<Option<String>>,
}

/// Validated card changes handed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub position: Option<i64>,
    pub labels: Option<Vec<String>>,
    pub due_date: Option<Option<i64>>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.position.is_none()
            && self.labels.is_none()
            && self.due_date.is_none()
    }

    pub fn validate(&self) -> Result<CardChanges, ValidationError> {
        let due_date = match &self.due_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(value)) => Some(Some(parse_due_date(value)?)),
        };
        Ok(CardChanges {
            title: self
                .title
                .as_deref()
                .map(|value| required_text("title", value, CARD_TITLE_MAX_CHARS))
                .transpose()?,
            description: self
                .description
                .as_deref()
                .map(|value| optional_text("description", Some(value), CARD_DESCRIPTION_MAX_CHARS))
                .transpose()?,
            position: check_position(self.position)?,
            labels: self.labels.as_deref().map(normalize_labels).transpose()?,
            due_date,
        })
    }
}

/// Parses a due date into epoch milliseconds.
///
/// Accepts an RFC 3339 timestamp or a `YYYY-MM-DD` calendar date, which is
/// read as UTC midnight.
pub fn parse_due_date(value: &str) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.timestamp_millis());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or(ValidationError::InvalidFormat {
            field: "due_date",
            expected: "an RFC 3339 timestamp or YYYY-MM-DD date",
        })
}

/// Trims labels, drops blanks and duplicates, keeps first-seen order.
pub fn normalize_labels(labels: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut normalized: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let Some(value) = optional_text("labels", Some(label), CARD_LABEL_MAX_CHARS)? else {
            continue;
        };
        if !normalized.contains(&value) {
            normalized.push(value);
        }
    }
    Ok(normalized)
}

/// Trims comment text and rejects blank input.
pub fn normalize_comment_text(text: &str) -> Result<String, ValidationError> {
    required_text("text", text, COMMENT_TEXT_MAX_CHARS)
}
