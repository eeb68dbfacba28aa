//! User domain model.
//!
//! # Responsibility
//! - Define the participant identity record referenced by events.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another user.
//! - Users are immutable after creation; no update or delete path exists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a registered participant.
pub type UserId = Uuid;

/// Participant identity record.
///
/// Deliberately minimal: events reference users only by id, and the
/// registry offers no mutation beyond creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable global ID used for participant references and auditing.
    pub uuid: UserId,
    /// Display name as entered at registration.
    pub name: String,
}

impl User {
    /// Creates a new user with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a user with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: UserId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}
