//! Event repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist events with their participant links and change ledger.
//! - Run the read-diff-append-write update sequence atomically.
//!
//! # Invariants
//! - Writes enforce `validate_fields` before SQL mutations.
//! - Update diffs are computed against the persisted row inside an
//!   IMMEDIATE transaction, never against a caller-supplied snapshot.
//! - A no-op update (empty diff) appends nothing to the ledger.
//! - The `version` guard turns a lost-update race into `Conflict`.

use crate::diff::diff_fields;
use crate::model::event::{validate_fields, ChangeRecord, Event, EventFields, EventId};
use crate::model::user::UserId;
use crate::repo::history_repo::{insert_change_record, load_changes_for_event};
use crate::repo::user_repo::missing_participant;
use crate::repo::{RepoError, RepoResult};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    start_at,
    end_at,
    timezone,
    version
FROM events";

/// Repository interface for event CRUD operations.
pub trait EventRepository {
    /// Persists a new event with its participant links, atomically.
    fn create_event(&mut self, event: &Event) -> RepoResult<EventId>;
    /// Applies new field values through the diff/ledger sequence and
    /// returns the updated event including its history.
    fn update_event_fields(&mut self, id: EventId, next: &EventFields) -> RepoResult<Event>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn list_events(&self) -> RepoResult<Vec<Event>>;
    fn list_events_for_participant(&self, user_id: UserId) -> RepoResult<Vec<Event>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&mut self, event: &Event) -> RepoResult<EventId> {
        validate_fields(&event.fields)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(missing) = missing_participant(&tx, &event.fields.participants)? {
            return Err(RepoError::UnknownUser(missing));
        }

        tx.execute(
            "INSERT INTO events (uuid, start_at, end_at, timezone, version)
             VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                event.uuid.to_string(),
                event.fields.start_at,
                event.fields.end_at,
                event.fields.timezone.as_str(),
            ],
        )?;
        replace_participants(&tx, event.uuid, &event.fields.participants)?;

        tx.commit()?;
        Ok(event.uuid)
    }

    fn update_event_fields(&mut self, id: EventId, next: &EventFields) -> RepoResult<Event> {
        validate_fields(next)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(current) = load_event(&tx, id)? else {
            return Err(RepoError::EventNotFound(id));
        };

        if let Some(missing) = missing_participant(&tx, &next.participants)? {
            return Err(RepoError::UnknownUser(missing));
        }

        let changes = diff_fields(&current.fields, next);
        if changes.is_empty() {
            // Idempotence contract: resubmitting identical values must
            // not pollute the ledger or bump the version.
            drop(tx);
            return Ok(current);
        }

        let changed_fields = changes.len();
        let record = ChangeRecord {
            recorded_at: Utc::now().timestamp_millis(),
            changes,
        };
        insert_change_record(&tx, id, &record)?;

        let changed = tx.execute(
            "UPDATE events
             SET
                start_at = ?2,
                end_at = ?3,
                timezone = ?4,
                version = version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND version = ?5;",
            params![
                id.to_string(),
                next.start_at,
                next.end_at,
                next.timezone.as_str(),
                current.version,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::Conflict(id));
        }

        replace_participants(&tx, id, &next.participants)?;
        tx.commit()?;

        info!(
            "event=event_update module=repo status=ok event_id={id} changed_fields={changed_fields}"
        );

        let Some(updated) = load_event(self.conn, id)? else {
            return Err(RepoError::EventNotFound(id));
        };
        Ok(updated)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        load_event(self.conn, id)
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        let ids = collect_event_ids(
            self.conn,
            &format!("{EVENT_SELECT_SQL} ORDER BY start_at ASC, uuid ASC;"),
            params![],
        )?;
        load_events_by_ids(self.conn, &ids)
    }

    fn list_events_for_participant(&self, user_id: UserId) -> RepoResult<Vec<Event>> {
        let sql = format!(
            "{EVENT_SELECT_SQL}
             WHERE EXISTS (
                SELECT 1
                FROM event_participants ep
                WHERE ep.event_uuid = events.uuid
                  AND ep.user_uuid = ?1
             )
             ORDER BY start_at ASC, uuid ASC;"
        );
        let ids = collect_event_ids(self.conn, &sql, [user_id.to_string()])?;
        load_events_by_ids(self.conn, &ids)
    }
}

/// Replaces the full participant link set for one event.
///
/// Set semantics: the whole link set is rewritten in the caller's
/// transaction, mirroring how the membership itself is compared.
fn replace_participants(
    tx: &Transaction<'_>,
    event_id: EventId,
    participants: &BTreeSet<UserId>,
) -> RepoResult<()> {
    let event_id_text = event_id.to_string();
    tx.execute(
        "DELETE FROM event_participants WHERE event_uuid = ?1;",
        [event_id_text.as_str()],
    )?;

    for user_id in participants {
        tx.execute(
            "INSERT INTO event_participants (event_uuid, user_uuid) VALUES (?1, ?2);",
            params![event_id_text.as_str(), user_id.to_string()],
        )?;
    }

    Ok(())
}

/// Loads one event with participants and full history.
fn load_event(conn: &Connection, id: EventId) -> RepoResult<Option<Event>> {
    let mut stmt = conn.prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;

    if let Some(row) = rows.next()? {
        return Ok(Some(hydrate_event(conn, row)?));
    }

    Ok(None)
}

fn hydrate_event(conn: &Connection, row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_event_uuid(&uuid_text)?;

    let event = Event {
        uuid,
        fields: EventFields {
            participants: load_participants(conn, &uuid_text)?,
            start_at: row.get("start_at")?,
            end_at: row.get("end_at")?,
            timezone: row.get("timezone")?,
        },
        version: row.get("version")?,
        history: load_changes_for_event(conn, uuid)?,
    };
    event.validate()?;
    Ok(event)
}

fn collect_event_ids<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Vec<EventId>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut ids = Vec::new();

    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        ids.push(parse_event_uuid(&uuid_text)?);
    }

    Ok(ids)
}

fn load_events_by_ids(conn: &Connection, ids: &[EventId]) -> RepoResult<Vec<Event>> {
    let mut events = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(event) = load_event(conn, *id)? {
            events.push(event);
        }
    }
    Ok(events)
}

fn load_participants(conn: &Connection, event_uuid: &str) -> RepoResult<BTreeSet<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_uuid
         FROM event_participants
         WHERE event_uuid = ?1
         ORDER BY user_uuid ASC;",
    )?;
    let mut rows = stmt.query([event_uuid])?;
    let mut participants = BTreeSet::new();

    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("user_uuid")?;
        let user_id = Uuid::parse_str(&uuid_text).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid uuid value `{uuid_text}` in event_participants.user_uuid"
            ))
        })?;
        participants.insert(user_id);
    }

    Ok(participants)
}

fn parse_event_uuid(value: &str) -> RepoResult<EventId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in events.uuid")))
}
