//! Task-board domain model.
//!
//! # Responsibility
//! - Define the read models for users, boards, lists, cards and comments.
//! - Define validated inputs and allow-listed patches for every entity kind.
//! - Own field-level validation and text normalization.
//!
//! # Invariants
//! - Every entity is identified by a stable `Uuid`.
//! - Text inputs are trimmed before validation and persistence.
//! - Patches only carry allow-listed fields; unknown input fields are ignored
//!   at deserialization time.

use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod board;
pub mod card;
pub mod list;
pub mod user;

/// Kind of entity reachable through the ownership chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Board,
    List,
    Card,
    Comment,
}

impl EntityKind {
    /// Stable lowercase name used in logs and error codes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Board => "board",
            Self::List => "list",
            Self::Card => "card",
            Self::Comment => "comment",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is absent or blank after trim.
    Required(&'static str),
    /// Field is shorter than allowed.
    TooShort {
        field: &'static str,
        min_chars: usize,
    },
    /// Field is longer than allowed.
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    /// Field does not match the expected shape.
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },
    /// Field must be a non-negative integer.
    NegativePosition(i64),
    /// Unique field is already used by another record.
    AlreadyTaken(&'static str),
    /// Identifier text is not a valid id.
    InvalidId { kind: EntityKind, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "`{field}` is required"),
            Self::TooShort { field, min_chars } => {
                write!(f, "`{field}` must be at least {min_chars} characters")
            }
            Self::TooLong { field, max_chars } => {
                write!(f, "`{field}` cannot exceed {max_chars} characters")
            }
            Self::InvalidFormat { field, expected } => {
                write!(f, "`{field}` must be {expected}")
            }
            Self::NegativePosition(value) => {
                write!(f, "`position` must not be negative, got {value}")
            }
            Self::AlreadyTaken(field) => write!(f, "`{field}` is already in use"),
            Self::InvalidId { kind, value } => write!(f, "invalid {kind} id `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Parses a transport-supplied id for the given entity kind.
pub fn parse_id(kind: EntityKind, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidId {
        kind,
        value: value.to_string(),
    })
}

/// Trims a required text field and checks its length bounds.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    check_max_chars(field, trimmed, max_chars)?;
    Ok(trimmed.to_string())
}

/// Trims an optional text field. Blank values collapse to `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    check_max_chars(field, trimmed, max_chars)?;
    Ok(Some(trimmed.to_string()))
}

pub(crate) fn check_position(position: Option<i64>) -> Result<Option<i64>, ValidationError> {
    match position {
        Some(value) if value < 0 => Err(ValidationError::NegativePosition(value)),
        other => Ok(other),
    }
}

fn check_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in patch payloads.
pub(crate) fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{optional_text, parse_id, required_text, EntityKind, ValidationError};

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("title", "  Todo ", 10).unwrap(), "Todo");
        assert_eq!(
            required_text("title", "   ", 10).unwrap_err(),
            ValidationError::Required("title")
        );
    }

    #[test]
    fn required_text_counts_chars_not_bytes() {
        assert!(required_text("title", "ééééé", 5).is_ok());
        assert_eq!(
            required_text("title", "ééééé", 4).unwrap_err(),
            ValidationError::TooLong {
                field: "title",
                max_chars: 4
            }
        );
    }

    #[test]
    fn optional_text_collapses_blank_to_none() {
        assert_eq!(optional_text("description", Some("  "), 5).unwrap(), None);
        assert_eq!(optional_text("description", None, 5).unwrap(), None);
        assert_eq!(
            optional_text("description", Some(" x "), 5).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn parse_id_rejects_malformed_values() {
        let err = parse_id(EntityKind::Card, "abc").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidId {
                kind: EntityKind::Card,
                ..
            }
        ));
    }
}
