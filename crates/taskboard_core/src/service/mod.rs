//! Board use-case services.
//!
//! # Responsibility
//! - Validate input, authorize through the ownership chain, then call the
//!   repository layer.
//! - Keep transport front-ends decoupled from storage details.
//!
//! # Invariants
//! - Validation and ownership failures are raised before any write.
//! - Every mutating call logs one `ok` event or one rejection event.

use log::{error, info, warn};

pub mod board_service;
pub mod card_service;
pub mod error;
pub mod list_service;
pub mod ownership;
pub mod reorder;
pub mod user_service;

use error::{BoardError, BoardResult};

/// Logs the outcome of one mutating operation and passes it through.
pub(crate) fn observe<T>(event: &'static str, result: BoardResult<T>) -> BoardResult<T> {
    match &result {
        Ok(_) => info!("event={event} module=service status=ok"),
        Err(BoardError::Internal(err)) => error!(
            "event={event} module=service status=error error_code=internal error={err}"
        ),
        Err(err) => warn!(
            "event={event} module=service status=rejected error_code={}",
            err.code()
        ),
    }
    result
}
