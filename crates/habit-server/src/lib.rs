//! HTTP boundary for Habit.
//!
//! Exposes an axum [`Router`] that accepts individual events onto their
//! queues and triggers sync cycles. The queue and archive are explicit
//! dependencies held in [`AppState`]; the binary creates them at startup.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/v1/triggers/add` | Body: `{"type","intensity","compulsion","notes"}` |
//! | `POST` | `/api/v1/actions/add` | Body: `{"type","relief","duration","notes"}` |
//! | `POST` | `/api/v1/overall/add` | Body: `{"clean_streak","gym_session","coding_hours","reading_hours","mood_score"}` |
//! | `GET`  | `/api/v1/sink` | Runs one sync cycle |
//! | `GET`  | `/api/v1/ping` | Liveness |

pub mod error;
pub mod handlers;

pub use error::{ApiError, ConfigError};

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  routing::{get, post},
};
use habit_core::{archive::ObjectStore, queue::EventQueue};
use habit_sync::{SyncConfig, Syncer};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use handlers::{events, sync};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HABIT_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Redis connection URL. Without one, events are buffered in process and
  /// lost on restart.
  pub redis_url:          Option<String>,
  pub working_path:       PathBuf,
  pub snapshot_path:      PathBuf,
  pub bucket:             String,
  pub key:                String,
  /// Base URL of an HTTP object store. Takes precedence over `archive_dir`.
  pub archive_endpoint:   Option<String>,
  pub archive_dir:        PathBuf,
  pub cycle_timeout_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let sync = SyncConfig::default();
    Self {
      host:               "0.0.0.0".to_string(),
      port:               8080,
      redis_url:          None,
      working_path:       sync.working_path,
      snapshot_path:      sync.snapshot_path,
      bucket:             sync.bucket,
      key:                sync.key,
      archive_endpoint:   None,
      archive_dir:        PathBuf::from("/tmp/habit-archive"),
      cycle_timeout_secs: sync.deadline.as_secs(),
    }
  }
}

impl ServerConfig {
  /// Reject settings that would make every sync cycle fail.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.cycle_timeout_secs == 0 {
      return Err(ConfigError::ZeroCycleTimeout);
    }
    Ok(())
  }

  pub fn sync_config(&self) -> SyncConfig {
    SyncConfig {
      working_path:  self.working_path.clone(),
      snapshot_path: self.snapshot_path.clone(),
      bucket:        self.bucket.clone(),
      key:           self.key.clone(),
      deadline:      Duration::from_secs(self.cycle_timeout_secs),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// The syncer sits behind an async mutex: concurrent `/sink` requests queue
/// up and run their cycles one after another.
pub struct AppState<Q, O> {
  pub queue:  Arc<Q>,
  pub syncer: Arc<Mutex<Syncer<Q, O>>>,
}

impl<Q, O> AppState<Q, O>
where
  Q: EventQueue,
  O: ObjectStore,
{
  pub fn new(queue: Arc<Q>, objects: Arc<O>, config: SyncConfig) -> Self {
    let syncer = Syncer::new(queue.clone(), objects, config);
    Self { queue, syncer: Arc::new(Mutex::new(syncer)) }
  }
}

impl<Q, O> Clone for AppState<Q, O> {
  fn clone(&self) -> Self {
    Self { queue: self.queue.clone(), syncer: self.syncer.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<Q, O>(state: AppState<Q, O>) -> Router
where
  Q: EventQueue + 'static,
  O: ObjectStore + 'static,
{
  let api = Router::new()
    .route("/triggers/add", post(events::add_trigger::<Q, O>))
    .route("/actions/add", post(events::add_action::<Q, O>))
    .route("/overall/add", post(events::add_overall::<Q, O>))
    .route("/sink", get(sync::sink::<Q, O>))
    .route("/ping", get(ping));

  Router::new()
    .nest("/api/v1", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `GET /api/v1/ping`
async fn ping() -> Json<&'static str> { Json("pong") }

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::io;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use habit_core::Kind;
  use habit_queue::MemoryQueue;
  use habit_sync::archive::DirObjectStore;
  use serde_json::Value;
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  fn sync_config_in(dir: &TempDir) -> SyncConfig {
    SyncConfig {
      working_path: dir.path().join("health.sqlite"),
      snapshot_path: dir.path().join("out.sqlite"),
      deadline: Duration::from_secs(30),
      ..SyncConfig::default()
    }
  }

  fn make_state(dir: &TempDir) -> AppState<MemoryQueue, DirObjectStore> {
    AppState::new(
      Arc::new(MemoryQueue::new()),
      Arc::new(DirObjectStore::new(dir.path().join("archive"))),
      sync_config_in(dir),
    )
  }

  async fn oneshot_raw<Q, O>(
    state: AppState<Q, O>,
    method: &str,
    uri: &str,
    body: &str,
  ) -> Response
  where
    Q: EventQueue + 'static,
    O: ObjectStore + 'static,
  {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_owned()))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Configuration ────────────────────────────────────────────────────────────

  #[test]
  fn default_config_is_valid() {
    assert_eq!(ServerConfig::default().validate(), Ok(()));
  }

  #[test]
  fn zero_cycle_timeout_is_rejected() {
    let cfg = ServerConfig { cycle_timeout_secs: 0, ..ServerConfig::default() };
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroCycleTimeout));
  }

  // ── Ping ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ping_returns_200() {
    let dir = tempfile::tempdir().unwrap();
    let resp = oneshot_raw(make_state(&dir), "GET", "/api/v1/ping", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ── Submission ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn valid_trigger_is_queued() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir);
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/api/v1/triggers/add",
      r#"{"type":"urge","intensity":7,"compulsion":true,"notes":"test"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Trigger logged successfully");
    assert_eq!(state.queue.len(Kind::Trigger.queue_name()), 1);
  }

  #[tokio::test]
  async fn trigger_without_type_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir);
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/api/v1/triggers/add",
      r#"{"intensity":3}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "Trigger type is required");
    assert!(state.queue.is_empty(Kind::Trigger.queue_name()));
  }

  #[tokio::test]
  async fn action_with_empty_type_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let resp = oneshot_raw(
      make_state(&dir),
      "POST",
      "/api/v1/actions/add",
      r#"{"type":"","relief":true,"duration":10}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn malformed_body_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let resp = oneshot_raw(
      make_state(&dir),
      "POST",
      "/api/v1/actions/add",
      r#"{"type":"walk","duration":"ten"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "Invalid request data");
  }

  #[tokio::test]
  async fn overall_accepts_empty_object() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir);
    let resp = oneshot_raw(state.clone(), "POST", "/api/v1/overall/add", "{}").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(state.queue.len(Kind::Overall.queue_name()), 1);
  }

  // ── Sync ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sink_drains_queues_and_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir);
    oneshot_raw(
      state.clone(),
      "POST",
      "/api/v1/actions/add",
      r#"{"type":"walk","relief":true,"duration":25,"notes":""}"#,
    )
    .await;

    let resp = oneshot_raw(state.clone(), "GET", "/api/v1/sink", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["inserted"]["action"], 1);
    assert_eq!(body["inserted"]["trigger"], 0);
    assert!(state.queue.is_empty(Kind::Action.queue_name()));
    assert!(dir.path().join("archive/health-tracking-utility/db/health.sqlite").exists());
  }

  /// An archive that refuses every write.
  struct RefusingArchive;

  impl ObjectStore for RefusingArchive {
    type Error = io::Error;

    async fn get(&self, _bucket: &str, _key: &str) -> io::Result<Option<Vec<u8>>> { Ok(None) }

    async fn put(&self, _bucket: &str, _key: &str, _body: Vec<u8>) -> io::Result<()> {
      Err(io::Error::new(io::ErrorKind::PermissionDenied, "bucket policy denies put"))
    }
  }

  #[tokio::test]
  async fn failed_sink_returns_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(
      Arc::new(MemoryQueue::new()),
      Arc::new(RefusingArchive),
      sync_config_in(&dir),
    );

    let resp = oneshot_raw(state, "GET", "/api/v1/sink", "").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "Failed to refresh database");
    assert!(!body.to_string().contains("bucket policy"), "{body}");
  }
}
