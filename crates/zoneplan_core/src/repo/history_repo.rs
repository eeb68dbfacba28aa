//! Change-ledger persistence: append and read paths.
//!
//! # Responsibility
//! - Serialize change records into the `event_changes` table.
//! - Provide per-event and cross-event ledger read APIs.
//!
//! # Invariants
//! - Append is the only mutation; no update or delete statement exists
//!   for ledger rows.
//! - Per-event reads are chronological by insertion order.
//! - The global feed is `recorded_at` descending with insertion order
//!   preserved for equal timestamps.

use crate::model::event::{ChangeRecord, EventId, FieldChange};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

/// Read interface over the append-only change ledger.
pub trait HistoryLedger {
    /// Returns all records for one event, chronological by insertion.
    fn for_event(&self, event_id: EventId) -> RepoResult<Vec<ChangeRecord>>;
    /// Flattens history across the given events, most recent first.
    fn global_feed(&self, event_ids: &[EventId]) -> RepoResult<Vec<(EventId, ChangeRecord)>>;
}

/// SQLite-backed ledger reader.
pub struct SqliteHistoryLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHistoryLedger<'conn> {
    /// Constructs a ledger reader from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl HistoryLedger for SqliteHistoryLedger<'_> {
    fn for_event(&self, event_id: EventId) -> RepoResult<Vec<ChangeRecord>> {
        load_changes_for_event(self.conn, event_id)
    }

    fn global_feed(&self, event_ids: &[EventId]) -> RepoResult<Vec<(EventId, ChangeRecord)>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; event_ids.len()].join(", ");
        let sql = format!(
            "SELECT event_uuid, recorded_at, changes
             FROM event_changes
             WHERE event_uuid IN ({placeholders})
             ORDER BY recorded_at DESC, id ASC;"
        );

        let bind_values: Vec<Value> = event_ids
            .iter()
            .map(|id| Value::Text(id.to_string()))
            .collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut feed = Vec::new();

        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("event_uuid")?;
            let event_id = Uuid::parse_str(&uuid_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid uuid value `{uuid_text}` in event_changes.event_uuid"
                ))
            })?;
            let record = ChangeRecord {
                recorded_at: row.get("recorded_at")?,
                changes: decode_changes(&row.get::<_, String>("changes")?)?,
            };
            feed.push((event_id, record));
        }

        Ok(feed)
    }
}

/// Appends one record inside the caller's open update transaction.
///
/// Callers guarantee `record.changes` is non-empty; the event repo
/// skips the append entirely for no-op updates.
pub(crate) fn insert_change_record(
    conn: &Connection,
    event_id: EventId,
    record: &ChangeRecord,
) -> RepoResult<()> {
    let payload = serde_json::to_string(&record.changes)
        .map_err(|err| RepoError::InvalidData(format!("unencodable change set: {err}")))?;

    conn.execute(
        "INSERT INTO event_changes (event_uuid, recorded_at, changes)
         VALUES (?1, ?2, ?3);",
        params![event_id.to_string(), record.recorded_at, payload],
    )?;

    Ok(())
}

/// Loads one event's ledger in insertion order.
pub(crate) fn load_changes_for_event(
    conn: &Connection,
    event_id: EventId,
) -> RepoResult<Vec<ChangeRecord>> {
    let mut stmt = conn.prepare(
        "SELECT recorded_at, changes
         FROM event_changes
         WHERE event_uuid = ?1
         ORDER BY id ASC;",
    )?;

    let mut rows = stmt.query([event_id.to_string()])?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        records.push(ChangeRecord {
            recorded_at: row.get("recorded_at")?,
            changes: decode_changes(&row.get::<_, String>("changes")?)?,
        });
    }

    Ok(records)
}

fn decode_changes(payload: &str) -> RepoResult<Vec<FieldChange>> {
    serde_json::from_str(payload).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid change payload in event_changes.changes: {err}"
        ))
    })
}
