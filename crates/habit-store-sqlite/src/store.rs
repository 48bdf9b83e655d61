//! [`SqliteStore`]: the relational sink a sync cycle drains into.

use std::{io, path::Path};

use habit_core::{Kind, Record};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{decode_row, execute_insert},
  schema::{SCHEMA, count_sql, insert_sql, select_sql},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Habit record store backed by a single SQLite file.
///
/// Clones share the inner connection. Opening does
/// not touch the schema; see [`tables_exist`](Self::tables_exist) and
/// [`create_tables`](Self::create_tables).
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database file at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Close the underlying connection, flushing it to disk.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  // ── Schema bootstrap ──────────────────────────────────────────────────────

  /// `true` only if every one of the three tables is present.
  ///
  /// A partial schema counts as absent.
  pub async fn tables_exist(&self) -> Result<bool> {
    let exists = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )?;
        for kind in Kind::ALL {
          let found = stmt
            .query_row([kind.table_name()], |_| Ok(()))
            .optional()?
            .is_some();
          if !found {
            return Ok(false);
          }
        }
        Ok(true)
      })
      .await?;
    Ok(exists)
  }

  /// Run the fixed DDL script for all three tables.
  pub async fn create_tables(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Batch insert ──────────────────────────────────────────────────────────

  /// Insert a homogeneous batch of `kind` records in a single transaction.
  ///
  /// The statement is prepared once and executed per record in input order.
  /// If any insert fails the transaction is dropped uncommitted, which rolls
  /// it back: either every record lands or none does. An empty batch is a
  /// no-op. Returns the number of rows inserted.
  pub async fn insert_batch(&self, kind: Kind, records: Vec<Record>) -> Result<usize> {
    if records.is_empty() {
      return Ok(0);
    }
    if let Some(stray) = records.iter().find(|r| r.kind() != kind) {
      return Err(Error::KindMismatch { expected: kind, found: stray.kind() });
    }

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(insert_sql(kind))?;
          for record in &records {
            execute_insert(&mut stmt, record)?;
          }
        }
        tx.commit()?;
        Ok(records.len())
      })
      .await?;

    tracing::debug!(%kind, inserted, "batch committed");
    Ok(inserted)
  }

  // ── Snapshot ──────────────────────────────────────────────────────────────

  /// Write a consistent point-in-time copy of the database to `path`,
  /// replacing any file already there.
  pub async fn snapshot_to(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let target = path
      .to_str()
      .ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))?
      .to_owned();

    match tokio::fs::remove_file(path).await {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(Error::Io(e)),
    }

    self
      .conn
      .call(move |conn| {
        conn.execute("VACUUM INTO ?1", [target])?;
        Ok(())
      })
      .await?;

    tracing::debug!(path = %path.display(), "snapshot written");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Number of rows in `kind`'s table.
  pub async fn count(&self, kind: Kind) -> Result<u64> {
    let sql = count_sql(kind);
    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(count as u64)
  }

  /// Every row in `kind`'s table, oldest first.
  pub async fn list(&self, kind: Kind) -> Result<Vec<Record>> {
    let sql = select_sql(kind);
    let records = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| decode_row(kind, row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(records)
  }
}
