//! Repository layer contracts and SQLite persistence.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Keep SQL, transactions and the parent-held ordering arrays inside the
//!   repository boundary.
//!
//! # Invariants
//! - Every write that touches a parent ordering array and child rows runs in
//!   one `BEGIN IMMEDIATE` transaction; an early return rolls it back.
//! - Repository APIs return semantic errors (`NotFound`, `StaleMembership`)
//!   in addition to DB transport errors.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::EntityKind;
use crate::position::SiblingGroup;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod board_repo;
pub mod card_repo;
pub mod list_repo;
pub mod ordering;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from board store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Another user already registered this email (case-insensitive).
    EmailTaken,
    /// Sibling membership changed between validation and commit.
    StaleMembership(SiblingGroup),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::EmailTaken => write!(f, "email is already registered"),
            Self::StaleMembership(group) => write!(
                f,
                "{} membership of {} {} changed during commit",
                group.child_kind(),
                group.parent_kind(),
                group.parent_id()
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "board store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Every repository contract the board services need.
pub trait BoardStore:
    user_repo::UserRepository
    + board_repo::BoardRepository
    + list_repo::ListRepository
    + card_repo::CardRepository
    + ordering::OrderingRepository
{
}

impl<T> BoardStore for T where
    T: user_repo::UserRepository
        + board_repo::BoardRepository
        + list_repo::ListRepository
        + card_repo::CardRepository
        + ordering::OrderingRepository
{
}

/// SQLite-backed board store over one explicitly passed connection.
#[derive(Debug, Clone, Copy)]
pub struct SqliteBoardStore<'conn> {
    conn: &'conn Connection,
}

const REQUIRED_TABLES: &[&str] = &["users", "boards", "lists", "cards", "card_comments"];

impl<'conn> SqliteBoardStore<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }

    /// Starts a write transaction. Dropping it without `commit` rolls back.
    pub(crate) fn begin_write(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn decode_id_array(value: &str, column: &'static str) -> RepoResult<Vec<Uuid>> {
    serde_json::from_str(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid id array in {column}: {err}")))
}

pub(crate) fn encode_id_array(ids: &[Uuid]) -> RepoResult<String> {
    serde_json::to_string(ids)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode id array: {err}")))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
