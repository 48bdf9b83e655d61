//! SQL for the Habit SQLite store.
//!
//! `trigger` and `action` are SQLite keywords, so table names are always
//! quoted.

use habit_core::Kind;

/// DDL for all three tables. Executed as one script by
/// [`SqliteStore::create_tables`](crate::SqliteStore::create_tables).
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "trigger" (
    id          TEXT PRIMARY KEY,
    timestamp   TEXT NOT NULL,      -- RFC 3339 UTC, second precision
    type        TEXT NOT NULL,
    intensity   INTEGER NOT NULL,
    compulsion  INTEGER NOT NULL,   -- 0 | 1
    notes       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS "action" (
    id          TEXT PRIMARY KEY,
    timestamp   TEXT NOT NULL,
    type        TEXT NOT NULL,
    relief      INTEGER NOT NULL,   -- 0 | 1
    duration    INTEGER NOT NULL,   -- minutes
    notes       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS "overall" (
    id            TEXT PRIMARY KEY,
    timestamp     TEXT NOT NULL,
    clean_streak  INTEGER NOT NULL,
    gym_session   INTEGER NOT NULL, -- 0 | 1
    coding_hours  INTEGER NOT NULL,
    reading_hours INTEGER NOT NULL,
    mood_score    INTEGER NOT NULL
);
"#;

const INSERT_TRIGGER: &str = r#"INSERT INTO "trigger"
    (id, timestamp, type, intensity, compulsion, notes)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#;

const INSERT_ACTION: &str = r#"INSERT INTO "action"
    (id, timestamp, type, relief, duration, notes)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#;

const INSERT_OVERALL: &str = r#"INSERT INTO "overall"
    (id, timestamp, clean_streak, gym_session, coding_hours, reading_hours, mood_score)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#;

/// Positional insert statement for `kind`, binding [`Kind::columns`] in order.
pub fn insert_sql(kind: Kind) -> &'static str {
  match kind {
    Kind::Trigger => INSERT_TRIGGER,
    Kind::Action => INSERT_ACTION,
    Kind::Overall => INSERT_OVERALL,
  }
}

/// `SELECT` over every column of `kind`'s table, oldest first.
pub fn select_sql(kind: Kind) -> String {
  format!(
    "SELECT {} FROM \"{}\" ORDER BY timestamp, id",
    kind.columns().join(", "),
    kind.table_name()
  )
}

pub fn count_sql(kind: Kind) -> String {
  format!("SELECT COUNT(*) FROM \"{}\"", kind.table_name())
}
