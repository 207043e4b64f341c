//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Email lookups are case-insensitive.
//! - `password_hash` only leaves the repository through `password_hash()`.

use super::{parse_uuid, RepoError, RepoResult, SqliteBoardStore};
use crate::model::user::{NewUser, User, UserId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    profile_image,
    created_at,
    updated_at
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts a normalized user. Fails with `EmailTaken` on a duplicate.
    fn insert_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Stored credential for the external sign-in collaborator.
    fn password_hash(&self, id: UserId) -> RepoResult<Option<String>>;
    fn update_profile_image(&self, id: UserId, reference: &str) -> RepoResult<User>;
    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()>;
}

impl UserRepository for SqliteBoardStore<'_> {
    fn insert_user(&self, user: &NewUser) -> RepoResult<User> {
        let tx = self.begin_write()?;
        let taken: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 COLLATE NOCASE);",
            [user.email.as_str()],
            |row| row.get(0),
        )?;
        if taken == 1 {
            return Err(RepoError::EmailTaken);
        }

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO users (id, name, email, password_hash)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                user.name.as_str(),
                user.email.as_str(),
                user.password_hash.as_str(),
            ],
        )?;
        let created = load_required_user(&tx, id)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        load_user(self.conn(), id)
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn().prepare(&format!(
            "{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"
        ))?;
        let mut rows = stmt.query([email.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT password_hash FROM users WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn update_profile_image(&self, id: UserId, reference: &str) -> RepoResult<User> {
        let changed = self.conn().execute(
            "UPDATE users
             SET profile_image = ?2,
                 updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![id.to_string(), reference],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::User, id));
        }
        load_required_user(self.conn(), id)
    }

    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE users
             SET password_hash = ?2,
                 updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![id.to_string(), password_hash],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::User, id));
        }
        Ok(())
    }
}

fn load_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_user_row(row)?));
    }
    Ok(None)
}

fn load_required_user(conn: &Connection, id: UserId) -> RepoResult<User> {
    load_user(conn, id)?.ok_or(RepoError::not_found(EntityKind::User, id))
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        profile_image: row.get("profile_image")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
