//! User domain model.
//!
//! # Invariants
//! - `email` is stored trimmed and lowercased; uniqueness is case-insensitive.
//! - The password credential is an opaque, already-hashed string and never
//!   part of the `User` read model.

use super::{required_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

pub const USER_NAME_MIN_CHARS: usize = 2;
pub const USER_NAME_MAX_CHARS: usize = 100;
pub const USER_EMAIL_MAX_CHARS: usize = 254;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// User read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Blob-store reference for the avatar. Empty when unset.
    pub profile_image: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Registration input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Returns a normalized copy or the first field error.
    pub fn normalized(&self) -> Result<NewUser, ValidationError> {
        let name = required_text("name", &self.name, USER_NAME_MAX_CHARS)?;
        if name.chars().count() < USER_NAME_MIN_CHARS {
            return Err(ValidationError::TooShort {
                field: "name",
                min_chars: USER_NAME_MIN_CHARS,
            });
        }
        let email = normalize_email(&self.email)?;
        if self.password_hash.trim().is_empty() {
            return Err(ValidationError::Required("password_hash"));
        }
        Ok(NewUser {
            name,
            email,
            password_hash: self.password_hash.clone(),
        })
    }
}

/// Trims, lowercases and shape-checks one email address.
pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let email = required_text("email", value, USER_EMAIL_MAX_CHARS)?.to_lowercase();
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            expected: "an address like name@example.com",
        });
    }
    Ok(email)
}
