//! Event domain model and change history records.
//!
//! # Responsibility
//! - Define the canonical event record with its mutable field set.
//! - Define the immutable change records appended on every edit.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another event.
//! - `start_at` must be strictly before `end_at`.
//! - `history` is append-only and chronological; entries are never
//!   edited or removed once written.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an event.
pub type EventId = Uuid;

/// The mutable portion of an event, compared field by field on update.
///
/// Kept as a separate struct so the diff engine works on exactly the
/// declared editable fields and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    /// Participant user ids. Unordered set semantics; duplicates are
    /// impossible by construction.
    pub participants: BTreeSet<UserId>,
    /// Start instant in epoch milliseconds (UTC).
    pub start_at: i64,
    /// End instant in epoch milliseconds (UTC). Must be > `start_at`.
    pub end_at: i64,
    /// IANA timezone identifier the owner scheduled the event in.
    ///
    /// Display in other zones is a viewer concern and never rewrites
    /// this field or the stored instants.
    pub timezone: String,
}

/// One field-level change with full before/after values.
///
/// A closed tagged variant per declared mutable field. The participants
/// variant carries complete before/after sets (not a delta), so
/// membership at any revision can be reconstructed from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldChange {
    Participants {
        old: BTreeSet<UserId>,
        new: BTreeSet<UserId>,
    },
    StartAt {
        old: i64,
        new: i64,
    },
    EndAt {
        old: i64,
        new: i64,
    },
    Timezone {
        old: String,
        new: String,
    },
}

impl FieldChange {
    /// Returns the wire/display name of the changed field.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Participants { .. } => "participants",
            Self::StartAt { .. } => "start_at",
            Self::EndAt { .. } => "end_at",
            Self::Timezone { .. } => "timezone",
        }
    }
}

/// Immutable, timestamped record of one committed edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Instant the record was appended, epoch milliseconds.
    pub recorded_at: i64,
    /// Non-empty set of field changes, at most one entry per field.
    pub changes: Vec<FieldChange>,
}

/// Canonical event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Stable global ID.
    pub uuid: EventId,
    /// Mutable field values as currently persisted.
    #[serde(flatten)]
    pub fields: EventFields,
    /// Monotonic revision counter, bumped on every committed update.
    pub version: i64,
    /// Append-only change ledger, chronological by insertion.
    pub history: Vec<ChangeRecord>,
}

impl Event {
    /// Creates a new event with a generated stable ID and empty history.
    ///
    /// # Invariants
    /// - `version` starts at 0 and `history` starts empty.
    /// - Field values are not validated here; call [`Event::validate`].
    pub fn new(fields: EventFields) -> Self {
        Self::with_id(Uuid::new_v4(), fields)
    }

    /// Creates an event with a caller-provided stable ID.
    pub fn with_id(uuid: EventId, fields: EventFields) -> Self {
        Self {
            uuid,
            fields,
            version: 0,
            history: Vec::new(),
        }
    }

    /// Validates domain invariants on the current field values.
    ///
    /// # Errors
    /// - `InvalidTimeRange` when `start_at` is not strictly before `end_at`.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_fields(&self.fields)
    }
}

/// Validates a candidate field set before it is persisted.
pub fn validate_fields(fields: &EventFields) -> Result<(), EventValidationError> {
    if fields.start_at >= fields.end_at {
        return Err(EventValidationError::InvalidTimeRange {
            start: fields.start_at,
            end: fields.end_at,
        });
    }
    Ok(())
}

/// Domain validation error for event field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// Start instant is not strictly before the end instant.
    InvalidTimeRange { start: i64, end: i64 },
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeRange { start, end } => {
                write!(f, "event end ({end}) must be after event start ({start})")
            }
        }
    }
}

impl Error for EventValidationError {}
