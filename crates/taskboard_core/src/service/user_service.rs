//! User account use-cases.
//!
//! Credential hashing and sign-in live outside the core; this service only
//! stores the opaque hash it is handed.

use super::error::{BoardError, BoardResult};
use super::observe;
use crate::model::user::{normalize_email, NewUser, User, UserId};
use crate::model::{EntityKind, ValidationError};
use crate::repo::BoardStore;

const PROFILE_IMAGE_MAX_CHARS: usize = 2048;

/// User service facade over a board store.
pub struct UserService<S: BoardStore> {
    store: S,
}

impl<S: BoardStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers one user. A taken email is a validation failure.
    pub fn register_user(&self, input: &NewUser) -> BoardResult<User> {
        observe("user_register", self.register_user_inner(input))
    }

    fn register_user_inner(&self, input: &NewUser) -> BoardResult<User> {
        let user = input.normalized()?;
        Ok(self.store.insert_user(&user)?)
    }

    pub fn get_user(&self, id: UserId) -> BoardResult<User> {
        self.store
            .get_user(id)?
            .ok_or(BoardError::not_found(EntityKind::User, id))
    }

    /// Case-insensitive lookup. Malformed addresses are rejected.
    pub fn find_user_by_email(&self, email: &str) -> BoardResult<Option<User>> {
        let email = normalize_email(email)?;
        Ok(self.store.find_user_by_email(&email)?)
    }

    /// Replaces the avatar reference. An empty reference clears it.
    pub fn set_profile_image(&self, principal: UserId, reference: &str) -> BoardResult<User> {
        observe(
            "user_profile_image",
            self.set_profile_image_inner(principal, reference),
        )
    }

    fn set_profile_image_inner(&self, principal: UserId, reference: &str) -> BoardResult<User> {
        let reference = reference.trim();
        if reference.chars().count() > PROFILE_IMAGE_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "profile_image",
                max_chars: PROFILE_IMAGE_MAX_CHARS,
            }
            .into());
        }
        Ok(self.store.update_profile_image(principal, reference)?)
    }

    pub fn set_password_hash(&self, principal: UserId, password_hash: &str) -> BoardResult<()> {
        observe(
            "user_password_hash",
            self.set_password_hash_inner(principal, password_hash),
        )
    }

    fn set_password_hash_inner(&self, principal: UserId, password_hash: &str) -> BoardResult<()> {
        if password_hash.trim().is_empty() {
            return Err(ValidationError::Required("password_hash").into());
        }
        Ok(self.store.update_password_hash(principal, password_hash)?)
    }

    /// Stored credential for the external sign-in collaborator.
    pub fn password_hash(&self, id: UserId) -> BoardResult<String> {
        self.store
            .password_hash(id)?
            .ok_or(BoardError::not_found(EntityKind::User, id))
    }
}
