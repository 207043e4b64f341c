//! Public error taxonomy for board use-cases.
//!
//! Every failure path of a service call maps to exactly one variant, and
//! `code()` gives transport callers a stable string for it.

use crate::model::{EntityKind, ValidationError};
use crate::position::SiblingGroup;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type BoardResult<T> = Result<T, BoardError>;

/// Detail of a rejected reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipMismatch {
    pub group: SiblingGroup,
    /// Current children absent from the proposed order.
    pub missing: Vec<Uuid>,
    /// Proposed ids that are not children of the parent.
    pub unexpected: Vec<Uuid>,
    /// Ids proposed more than once.
    pub duplicates: Vec<Uuid>,
}

impl MembershipMismatch {
    pub(crate) fn new(group: SiblingGroup) -> Self {
        Self {
            group,
            missing: Vec::new(),
            unexpected: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    /// True when the proposed order was valid but the children changed
    /// before it could be committed.
    pub fn is_stale(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.duplicates.is_empty()
    }
}

/// Error returned by board services.
#[derive(Debug)]
pub enum BoardError {
    /// Missing or malformed input field or id.
    Validation(ValidationError),
    /// Entity or a link of its ownership chain does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Ownership chain resolves to another user.
    Forbidden { kind: EntityKind, id: Uuid },
    /// Proposed order does not match the current children exactly.
    InvalidMembership(MembershipMismatch),
    /// Update request carried no allow-listed field.
    NoFieldsToUpdate(EntityKind),
    /// Reserved for version-checked writes. Never produced today.
    Conflict(String),
    /// Storage or transaction failure. Nothing was committed.
    Internal(RepoError),
}

impl BoardError {
    /// Stable snake_case code for transport mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidMembership(_) => "invalid_membership",
            Self::NoFieldsToUpdate(_) => "no_fields_to_update",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Forbidden { kind, id } => write!(f, "{kind} {id} belongs to another user"),
            Self::InvalidMembership(mismatch) if mismatch.is_stale() => write!(
                f,
                "{} children of {} {} changed while the reorder was committed; reload and retry",
                mismatch.group.child_kind(),
                mismatch.group.parent_kind(),
                mismatch.group.parent_id()
            ),
            Self::InvalidMembership(mismatch) => write!(
                f,
                "proposed order must contain every {} of {} {} exactly once \
                 (missing {}, unexpected {}, duplicated {})",
                mismatch.group.child_kind(),
                mismatch.group.parent_kind(),
                mismatch.group.parent_id(),
                mismatch.missing.len(),
                mismatch.unexpected.len(),
                mismatch.duplicates.len()
            ),
            Self::NoFieldsToUpdate(kind) => write!(f, "no updatable {kind} fields in request"),
            Self::Conflict(message) => write!(f, "conflicting write: {message}"),
            Self::Internal(err) => write!(f, "internal storage failure: {err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for BoardError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::StaleMembership(group) => {
                Self::InvalidMembership(MembershipMismatch::new(group))
            }
            RepoError::EmailTaken => Self::Validation(ValidationError::AlreadyTaken("email")),
            other => Self::Internal(other),
        }
    }
}
