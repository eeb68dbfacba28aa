//! Core domain logic for ZonePlan: timezone-aware event scheduling with
//! a field-level change-audit ledger.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod diff;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod time;

pub use diff::diff_fields;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{
    ChangeRecord, Event, EventFields, EventId, EventValidationError, FieldChange,
};
pub use model::user::{User, UserId};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::history_repo::{HistoryLedger, SqliteHistoryLedger};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::event_service::{
    event_in_zone, EventService, EventZoneView, ScheduleError, ScheduleRequest, ScheduleResult,
};
pub use service::user_service::UserService;
pub use time::{to_instant, to_local_display, LocalStamp, TimeError, TimeResult};

/// Minimal health-check API for early integration.
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
