//! Wall-clock/instant conversion against the IANA timezone database.
//!
//! # Responsibility
//! - Resolve a local date+time in a named zone to an absolute instant.
//! - Project an instant back into any zone's wall-clock representation.
//!
//! # Invariants
//! - Conversion is deterministic: identical input always yields the
//!   same instant, including at DST transitions.
//! - A nonexistent local time (spring-forward gap) resolves to the
//!   first valid instant after the gap.
//! - An ambiguous local time (fall-back overlap) resolves to the
//!   earlier of the two candidate instants.
//! - Projection never mutates the instant it displays.

use chrono::{Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire format for local dates, e.g. `2024-03-10`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for local times, e.g. `09:00`.
pub const TIME_FORMAT: &str = "%H:%M";

/// Upper bound for the spring-forward gap scan. The largest known tz
/// transition skipped one full day (Pacific/Apia, 2011), so two days
/// of one-minute probes covers every real zone.
const MAX_GAP_SCAN_MINUTES: i64 = 48 * 60;

/// Result type for time conversion APIs.
pub type TimeResult<T> = Result<T, TimeError>;

/// Conversion error for wall-clock/instant resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Date or time string does not match the expected wire format.
    InvalidTimeInput {
        value: String,
        expected: &'static str,
    },
    /// Identifier is not present in the timezone database.
    UnknownTimezone(String),
}

impl Display for TimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeInput { value, expected } => {
                write!(f, "invalid time input `{value}`, expected `{expected}`")
            }
            Self::UnknownTimezone(zone) => write!(f, "unknown timezone identifier `{zone}`"),
        }
    }
}

impl Error for TimeError {}

/// Wall-clock projection of one instant in one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStamp {
    /// Local date formatted as [`DATE_FORMAT`].
    pub date: String,
    /// Local time formatted as [`TIME_FORMAT`].
    pub time: String,
}

/// Resolves a local date+time in the named zone to epoch milliseconds.
///
/// # Contract
/// - `date` must match `YYYY-MM-DD`, `time` must match `HH:MM`.
/// - DST gap: shifts forward to the first valid instant after the gap.
/// - DST overlap: picks the earlier candidate instant.
///
/// # Errors
/// - `InvalidTimeInput` when either string fails to parse.
/// - `UnknownTimezone` when the identifier is not in the tz database.
pub fn to_instant(date: &str, time: &str, zone: &str) -> TimeResult<i64> {
    let zone = parse_zone(zone)?;
    let local = parse_local(date, time)?;

    match zone.from_local_datetime(&local) {
        LocalResult::Single(resolved) => Ok(resolved.timestamp_millis()),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.timestamp_millis()),
        LocalResult::None => resolve_gap(zone, local, date, time),
    }
}

/// Projects an instant into the named zone's wall clock for display.
///
/// # Errors
/// - `UnknownTimezone` when the identifier is not in the tz database.
pub fn to_local_display(instant_ms: i64, zone: &str) -> TimeResult<LocalStamp> {
    let zone = parse_zone(zone)?;
    let utc = match Utc.timestamp_millis_opt(instant_ms) {
        LocalResult::Single(value) => value,
        _ => {
            return Err(TimeError::InvalidTimeInput {
                value: instant_ms.to_string(),
                expected: "epoch milliseconds",
            });
        }
    };

    let local = utc.with_timezone(&zone);
    Ok(LocalStamp {
        date: local.format(DATE_FORMAT).to_string(),
        time: local.format(TIME_FORMAT).to_string(),
    })
}

fn parse_zone(zone: &str) -> TimeResult<Tz> {
    zone.parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(zone.to_string()))
}

fn parse_local(date: &str, time: &str) -> TimeResult<NaiveDateTime> {
    let date_part =
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| TimeError::InvalidTimeInput {
            value: date.to_string(),
            expected: "YYYY-MM-DD",
        })?;
    let time_part =
        NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| TimeError::InvalidTimeInput {
            value: time.to_string(),
            expected: "HH:MM",
        })?;
    Ok(date_part.and_time(time_part))
}

/// Scans forward from a nonexistent wall time to the first local time
/// the zone can represent, which maps to the first instant after the
/// transition gap. One-minute steps keep the scan exact for zones with
/// sub-hour offsets.
fn resolve_gap(zone: Tz, local: NaiveDateTime, date: &str, time: &str) -> TimeResult<i64> {
    let mut probe = local;
    for _ in 0..MAX_GAP_SCAN_MINUTES {
        probe += Duration::minutes(1);
        match zone.from_local_datetime(&probe) {
            LocalResult::Single(resolved) => return Ok(resolved.timestamp_millis()),
            LocalResult::Ambiguous(earlier, _later) => return Ok(earlier.timestamp_millis()),
            LocalResult::None => continue,
        }
    }

    Err(TimeError::InvalidTimeInput {
        value: format!("{date} {time}"),
        expected: "a local time within 48h of a representable instant",
    })
}
