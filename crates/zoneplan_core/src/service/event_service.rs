//! Event scheduling use-case service.
//!
//! # Responsibility
//! - Resolve wall-clock input into instants before persistence.
//! - Provide create/read/update entry points over the event repository.
//! - Offer viewer-zone display projections that never touch storage.
//!
//! # Invariants
//! - Time resolution and repository failures surface unchanged; the
//!   service neither wraps nor swallows lower-layer error kinds.
//! - Update semantics (diff against persisted state, ledger append,
//!   no-op idempotence) live in the repository transaction; this layer
//!   only shapes input and output.

use crate::model::event::{Event, EventFields, EventId};
use crate::model::user::UserId;
use crate::repo::event_repo::EventRepository;
use crate::repo::RepoError;
use crate::time::{to_instant, to_local_display, LocalStamp, TimeError};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for scheduling APIs.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Service-level error: either time resolution or persistence failed.
#[derive(Debug)]
pub enum ScheduleError {
    Time(TimeError),
    Repo(RepoError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Time(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Time(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TimeError> for ScheduleError {
    fn from(value: TimeError) -> Self {
        Self::Time(value)
    }
}

impl From<RepoError> for ScheduleError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Wall-clock scheduling input as entered by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    /// Participant user ids; may be empty.
    pub participants: BTreeSet<UserId>,
    /// Local start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Local start time, `HH:MM`.
    pub start_time: String,
    /// Local end date, `YYYY-MM-DD`.
    pub end_date: String,
    /// Local end time, `HH:MM`.
    pub end_time: String,
    /// IANA timezone the wall-clock values are expressed in.
    pub timezone: String,
}

/// Display projection of an event window in a viewer-chosen zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventZoneView {
    /// Zone the projection was rendered in.
    pub timezone: String,
    pub start: LocalStamp,
    pub end: LocalStamp,
}

/// Use-case service for event scheduling and editing.
pub struct EventService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> EventService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Schedules a new event from wall-clock input.
    ///
    /// # Contract
    /// - Both instants resolve in the request's timezone.
    /// - Fails with `InvalidTimeRange` when start is not strictly
    ///   before end; nothing is persisted on any failure.
    /// - The new event starts with version 0 and an empty history.
    pub fn create_event(&mut self, request: &ScheduleRequest) -> ScheduleResult<Event> {
        let fields = resolve_fields(request)?;
        let event = Event::new(fields);
        self.repo.create_event(&event)?;
        Ok(event)
    }

    /// Applies edited wall-clock input to an existing event.
    ///
    /// The repository diffs the resolved values against the persisted
    /// state and appends a change record only when something actually
    /// differs. Returns the updated event including its history.
    pub fn update_event(&mut self, id: EventId, request: &ScheduleRequest) -> ScheduleResult<Event> {
        let fields = resolve_fields(request)?;
        Ok(self.repo.update_event_fields(id, &fields)?)
    }

    /// Gets one event by stable ID, history included.
    pub fn get_event(&self, id: EventId) -> ScheduleResult<Event> {
        self.repo
            .get_event(id)?
            .ok_or(ScheduleError::Repo(RepoError::EventNotFound(id)))
    }

    /// Lists all events ordered by start instant.
    pub fn list_events(&self) -> ScheduleResult<Vec<Event>> {
        Ok(self.repo.list_events()?)
    }

    /// Lists events the given user participates in.
    pub fn list_events_for_user(&self, user_id: UserId) -> ScheduleResult<Vec<Event>> {
        Ok(self.repo.list_events_for_participant(user_id)?)
    }
}

/// Projects an event's window into a viewer-chosen display zone.
///
/// Pure read: the stored instants and the owner's `timezone` field are
/// never modified by rendering in another zone.
pub fn event_in_zone(event: &Event, zone: &str) -> ScheduleResult<EventZoneView> {
    Ok(EventZoneView {
        timezone: zone.to_string(),
        start: to_local_display(event.fields.start_at, zone)?,
        end: to_local_display(event.fields.end_at, zone)?,
    })
}

fn resolve_fields(request: &ScheduleRequest) -> ScheduleResult<EventFields> {
    let start_at = to_instant(&request.start_date, &request.start_time, &request.timezone)?;
    let end_at = to_instant(&request.end_date, &request.end_time, &request.timezone)?;

    Ok(EventFields {
        participants: request.participants.clone(),
        start_at,
        end_at,
        timezone: request.timezone.clone(),
    })
}
