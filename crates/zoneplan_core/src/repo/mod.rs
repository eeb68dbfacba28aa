//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Event writes enforce `validate_fields` before persistence.
//! - The update path computes its diff against the persisted state
//!   inside the same transaction that writes the new state.
//! - Repository APIs return semantic errors (`EventNotFound`,
//!   `UnknownUser`, `Conflict`) in addition to DB transport errors.

use crate::db::DbError;
use crate::model::event::{EventId, EventValidationError};
use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event_repo;
pub mod history_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    /// No event row exists for the given id.
    EventNotFound(EventId),
    /// A participant id does not reference a registered user.
    UnknownUser(UserId),
    /// The optimistic version guard failed; the caller should re-read
    /// and retry the whole update.
    Conflict(EventId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::UnknownUser(id) => write!(f, "unknown user: {id}"),
            Self::Conflict(id) => write!(f, "concurrent update detected for event {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::EventNotFound(_) => None,
            Self::UnknownUser(_) => None,
            Self::Conflict(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
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
