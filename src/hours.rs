//! Working hours policy
//!
//! Answers one question: is the gateway open right now? Every scheduling
//! decision is made in a single fixed civil timezone (Moscow), regardless of
//! where the server or the payer happens to be.
//!
//! The policy is a pure read over the per-weekday table. A day with no row
//! or a disabled row is closed; otherwise the gate is open while the local
//! time of day falls in `[work_start, work_end)`.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use chrono_tz::Tz;
use redb::{Database, ReadableDatabase, ReadableTable};

use crate::database::TABLE_HOURS;
use crate::error::ApiError;
use crate::model::{SetHoursRequest, WorkingHoursEntry};

/// The fixed civil timezone used for all scheduling decisions
pub const GATEWAY_TZ: Tz = chrono_tz::Europe::Moscow;

/// Time source, injectable so tests can pin the current instant
#[derive(Clone, Debug)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Default schedule row installed at first boot: enabled, 10:00-21:00
pub fn default_entry(day_of_week: u8) -> WorkingHoursEntry {
    WorkingHoursEntry {
        day_of_week,
        work_start: NaiveTime::from_hms_opt(10, 0, 0).expect("valid literal time"),
        work_end: NaiveTime::from_hms_opt(21, 0, 0).expect("valid literal time"),
        is_enabled: true,
    }
}

/// English weekday name for payer-facing closure messages
fn day_name(day_of_week: u8) -> &'static str {
    match day_of_week {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        6 => "Sunday",
        _ => "Unknown",
    }
}

/// Returns whether the gateway accepts issuance at `now`
pub fn is_open(db: &Database, now: DateTime<Utc>) -> Result<bool, ApiError> {
    Ok(closed_reason(db, now)?.is_none())
}

/// `None` when open; otherwise a human-readable closure message
///
/// The message distinguishes a fully disabled day from an out-of-hours
/// moment, so the payer page can show the day's configured window.
pub fn closed_reason(db: &Database, now: DateTime<Utc>) -> Result<Option<String>, ApiError> {
    let local = now.with_timezone(&GATEWAY_TZ);
    let day = local.weekday().num_days_from_monday() as u8;

    let entry = match entry_for_day(db, day)? {
        Some(entry) if entry.is_enabled => entry,
        // No configuration means closed; the seed at first boot is the only
        // place defaults come from
        _ => {
            return Ok(Some(format!(
                "{} is not a working day",
                day_name(day)
            )))
        }
    };

    let time_of_day = local.time();
    if time_of_day >= entry.work_start && time_of_day < entry.work_end {
        Ok(None)
    } else {
        Ok(Some(format!(
            "Working hours: {} - {}",
            entry.work_start.format("%H:%M"),
            entry.work_end.format("%H:%M"),
        )))
    }
}

/// Looks up the schedule row for one weekday
pub fn entry_for_day(db: &Database, day_of_week: u8) -> Result<Option<WorkingHoursEntry>, ApiError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(TABLE_HOURS)?;

    match table.get(day_of_week)? {
        Some(guard) => Ok(Some(serde_json::from_str(guard.value())?)),
        None => Ok(None),
    }
}

/// All schedule rows ordered by weekday, for the admin console
pub fn list_hours(db: &Database) -> Result<Vec<WorkingHoursEntry>, ApiError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(TABLE_HOURS)?;

    let mut entries = Vec::new();
    for item in table.iter()? {
        let (_, value) = item?;
        entries.push(serde_json::from_str(value.value())?);
    }
    Ok(entries)
}

/// Upserts the schedule row for one weekday; idempotent
///
/// Rejects unknown weekday indexes, malformed `HH:MM` strings and
/// `work_start >= work_end` before touching storage.
pub fn set_hours(db: &Database, req: &SetHoursRequest) -> Result<WorkingHoursEntry, ApiError> {
    if req.day_of_week > 6 {
        return Err(ApiError::Validation(
            "day_of_week must be between 0 (Monday) and 6 (Sunday)".to_string(),
        ));
    }

    let work_start = parse_hhmm(&req.work_start)?;
    let work_end = parse_hhmm(&req.work_end)?;

    if work_start >= work_end {
        return Err(ApiError::Validation(
            "work_start must be before work_end".to_string(),
        ));
    }

    let entry = WorkingHoursEntry {
        day_of_week: req.day_of_week,
        work_start,
        work_end,
        is_enabled: req.is_enabled,
    };
    let entry_json = serde_json::to_string(&entry)?;

    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(TABLE_HOURS)?;
        table.insert(req.day_of_week, entry_json.as_str())?;
    }
    write_txn.commit()?;

    Ok(entry)
}

fn parse_hhmm(raw: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| ApiError::Validation("Invalid time format. Use HH:MM".to_string()))
}
