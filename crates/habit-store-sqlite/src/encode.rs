//! Encoding and decoding helpers between record shapes and SQLite rows.
//!
//! Timestamps are stored as RFC 3339 strings at second precision, UUIDs as
//! hyphenated lowercase strings, booleans as `0`/`1`.

use chrono::{DateTime, SecondsFormat, Utc};
use habit_core::{
  Kind, Record,
  record::{Action, Overall, Trigger},
};
use rusqlite::{Row, Statement, params, types::Type};
use uuid::Uuid;

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn conversion_error(
  idx: usize,
  e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
  let raw: String = row.get(idx)?;
  Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn get_dt(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  let raw: String = row.get(idx)?;
  DateTime::parse_from_rfc3339(&raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| conversion_error(idx, e))
}

// ─── Insert ──────────────────────────────────────────────────────────────────

/// Execute the prepared insert statement for `record`'s kind once.
///
/// `stmt` must have been prepared from
/// [`insert_sql(record.kind())`](crate::schema::insert_sql).
pub fn execute_insert(
  stmt: &mut Statement<'_>,
  record: &Record,
) -> rusqlite::Result<usize> {
  match record {
    Record::Trigger(t) => stmt.execute(params![
      encode_uuid(t.id),
      encode_dt(t.timestamp),
      t.category,
      t.intensity,
      t.compulsion,
      t.notes,
    ]),
    Record::Action(a) => stmt.execute(params![
      encode_uuid(a.id),
      encode_dt(a.timestamp),
      a.category,
      a.relief,
      a.duration,
      a.notes,
    ]),
    Record::Overall(o) => stmt.execute(params![
      encode_uuid(o.id),
      encode_dt(o.timestamp),
      o.clean_streak,
      o.gym_session,
      o.coding_hours,
      o.reading_hours,
      o.mood_score,
    ]),
  }
}

// ─── Select ──────────────────────────────────────────────────────────────────

/// Decode a row selected with [`select_sql(kind)`](crate::schema::select_sql).
pub fn decode_row(kind: Kind, row: &Row<'_>) -> rusqlite::Result<Record> {
  let id = get_uuid(row, 0)?;
  let timestamp = get_dt(row, 1)?;
  let record = match kind {
    Kind::Trigger => Record::Trigger(Trigger {
      id,
      timestamp,
      category: row.get(2)?,
      intensity: row.get(3)?,
      compulsion: row.get(4)?,
      notes: row.get(5)?,
    }),
    Kind::Action => Record::Action(Action {
      id,
      timestamp,
      category: row.get(2)?,
      relief: row.get(3)?,
      duration: row.get(4)?,
      notes: row.get(5)?,
    }),
    Kind::Overall => Record::Overall(Overall {
      id,
      timestamp,
      clean_streak: row.get(2)?,
      gym_session: row.get(3)?,
      coding_hours: row.get(4)?,
      reading_hours: row.get(5)?,
      mood_score: row.get(6)?,
    }),
  };
  Ok(record)
}
