//! [`Syncer`]: one drain-and-archive cycle, start to finish.
//!
//! ```text
//! reset → restore → CheckSchema ─┬─────────────────┬→ DrainAndInsert → SnapshotLocal → UploadRemote → Done
//!                                └→ CreateSchema ──┘
//! ```
//!
//! Any stage can fail the cycle. Nothing is retried here: the caller decides
//! whether to run another cycle.

use std::{
  collections::BTreeMap,
  fmt, io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use habit_core::{Kind, archive::ObjectStore, queue::EventQueue};
use habit_store_sqlite::SqliteStore;
use serde::Serialize;

use crate::{Error, Result, drain::drain};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Where a cycle keeps its files and where it archives them.
#[derive(Debug, Clone)]
pub struct SyncConfig {
  /// Local working copy, rebuilt from the archive at the start of each cycle.
  pub working_path:  PathBuf,
  /// Local snapshot written at the end of each cycle and then uploaded.
  pub snapshot_path: PathBuf,
  pub bucket:        String,
  pub key:           String,
  /// Upper bound on a whole cycle.
  pub deadline:      Duration,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      working_path:  PathBuf::from("/tmp/health.sqlite"),
      snapshot_path: PathBuf::from("/tmp/out.sqlite"),
      bucket:        "health-tracking-utility".to_string(),
      key:           "db/health.sqlite".to_string(),
      deadline:      Duration::from_secs(15 * 60),
    }
  }
}

// ─── Stages and outcome ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Reset,
  Restore,
  CheckSchema,
  CreateSchema,
  DrainAndInsert,
  SnapshotLocal,
  UploadRemote,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::Reset => "reset",
      Stage::Restore => "restore",
      Stage::CheckSchema => "check_schema",
      Stage::CreateSchema => "create_schema",
      Stage::DrainAndInsert => "drain_and_insert",
      Stage::SnapshotLocal => "snapshot_local",
      Stage::UploadRemote => "upload_remote",
    };
    f.write_str(name)
  }
}

/// Outcome of a completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
  /// Whether the tables had to be created during this cycle.
  pub schema_created: bool,
  /// Rows inserted per kind.
  pub inserted:       BTreeMap<Kind, usize>,
}

impl CycleReport {
  pub fn inserted(&self, kind: Kind) -> usize {
    self.inserted.get(&kind).copied().unwrap_or(0)
  }

  pub fn total_inserted(&self) -> usize { self.inserted.values().sum() }
}

// ─── Syncer ──────────────────────────────────────────────────────────────────

/// Runs sync cycles against an explicit queue and object store.
///
/// A `Syncer` takes no lock of its own. Only one cycle may run at a time
/// against the same working files; callers must serialize
/// [`run_cycle`](Self::run_cycle).
pub struct Syncer<Q, O> {
  queue:   Arc<Q>,
  objects: Arc<O>,
  config:  SyncConfig,
}

impl<Q, O> Syncer<Q, O>
where
  Q: EventQueue,
  O: ObjectStore,
{
  pub fn new(queue: Arc<Q>, objects: Arc<O>, config: SyncConfig) -> Self {
    Self { queue, objects, config }
  }

  pub fn config(&self) -> &SyncConfig { &self.config }

  /// Run one full cycle within the configured deadline.
  pub async fn run_cycle(&self) -> Result<CycleReport> {
    let deadline = self.config.deadline;
    let report = tokio::time::timeout(deadline, self.cycle())
      .await
      .map_err(|_| Error::DeadlineExceeded(deadline))??;

    tracing::info!(
      schema_created = report.schema_created,
      inserted = report.total_inserted(),
      "sync cycle done"
    );
    Ok(report)
  }

  async fn cycle(&self) -> Result<CycleReport> {
    enter(Stage::Reset);
    self.reset().await?;

    enter(Stage::Restore);
    self.restore().await?;

    let store = SqliteStore::open(&self.config.working_path)
      .await
      .map_err(Error::Open)?;
    let outcome = self.persist(&store).await;
    if let Err(e) = store.close().await {
      tracing::warn!(error = %e, "failed to close working copy");
    }
    outcome
  }

  /// Discard the local working copy and snapshot left by an earlier cycle.
  async fn reset(&self) -> Result<()> {
    for path in [&self.config.working_path, &self.config.snapshot_path] {
      remove_if_present(path).await.map_err(Error::Reset)?;
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(Error::Reset)?;
      }
    }
    Ok(())
  }

  /// Repopulate the working copy from the archived snapshot, if there is one.
  async fn restore(&self) -> Result<()> {
    let SyncConfig { bucket, key, working_path, .. } = &self.config;
    let archived = self
      .objects
      .get(bucket, key)
      .await
      .map_err(|e| Error::Restore(Box::new(e)))?;

    match archived {
      Some(bytes) => {
        tracing::info!(bytes = bytes.len(), "restoring archived snapshot");
        tokio::fs::write(working_path, bytes)
          .await
          .map_err(|e| Error::Restore(Box::new(e)))?;
      }
      None => tracing::info!("no archived snapshot; starting from an empty store"),
    }
    Ok(())
  }

  async fn persist(&self, store: &SqliteStore) -> Result<CycleReport> {
    let mut report = CycleReport::default();

    enter(Stage::CheckSchema);
    if !store.tables_exist().await.map_err(Error::SchemaCheck)? {
      enter(Stage::CreateSchema);
      store.create_tables().await.map_err(Error::Schema)?;
      report.schema_created = true;
    }

    enter(Stage::DrainAndInsert);
    for kind in Kind::ALL {
      let records = drain(self.queue.as_ref(), kind).await?;
      tracing::info!(%kind, found = records.len(), queue = kind.queue_name(), "drained");
      let inserted = store
        .insert_batch(kind, records)
        .await
        .map_err(|source| Error::Insertion { kind, source })?;
      report.inserted.insert(kind, inserted);
    }

    enter(Stage::SnapshotLocal);
    store
      .snapshot_to(&self.config.snapshot_path)
      .await
      .map_err(Error::Snapshot)?;

    enter(Stage::UploadRemote);
    self.upload().await?;

    Ok(report)
  }

  async fn upload(&self) -> Result<()> {
    let SyncConfig { bucket, key, snapshot_path, .. } = &self.config;
    let body = tokio::fs::read(snapshot_path)
      .await
      .map_err(|e| Error::Upload(Box::new(e)))?;
    tracing::info!(bytes = body.len(), %bucket, %key, "uploading snapshot");
    self
      .objects
      .put(bucket, key, body)
      .await
      .map_err(|e| Error::Upload(Box::new(e)))?;
    Ok(())
  }
}

fn enter(stage: Stage) { tracing::info!(%stage, "sync stage"); }

async fn remove_if_present(path: &Path) -> io::Result<()> {
  match tokio::fs::remove_file(path).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}
