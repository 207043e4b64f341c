//! Core domain logic for the task board.
//!
//! Users own boards, boards hold ordered lists, lists hold ordered cards with
//! comments. This crate owns every ordering and ownership invariant; front-ends
//! only translate requests and errors.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod position;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::{parse_id, EntityKind, ValidationError};
pub use position::{PositionUpdate, SiblingGroup};
pub use repo::{BoardStore, RepoError, RepoResult, SqliteBoardStore};
pub use service::board_service::BoardService;
pub use service::card_service::CardService;
pub use service::error::{BoardError, BoardResult, MembershipMismatch};
pub use service::list_service::ListService;
pub use service::user_service::UserService;

/// Minimal health-check API for front-ends.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
