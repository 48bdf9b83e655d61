//! Bundled [`ObjectStore`] implementations for snapshot archival.
//!
//! - [`HttpObjectStore`] talks to any endpoint that serves objects at
//!   `GET/PUT {endpoint}/{bucket}/{key}` (an S3-compatible gateway with
//!   path-style addressing, a MinIO bucket behind a signing proxy, ...).
//! - [`DirObjectStore`] maps buckets to directories on the local filesystem.

use std::{
  io,
  path::{Component, Path, PathBuf},
  time::Duration,
};

use habit_core::archive::ObjectStore;
use reqwest::{Client, StatusCode};

use crate::error::ArchiveError;

// ─── HTTP ────────────────────────────────────────────────────────────────────

/// Object store reached over plain HTTP `GET`/`PUT`.
///
/// Clones share the inner [`reqwest::Client`] connection pool.
#[derive(Clone)]
pub struct HttpObjectStore {
  client:   Client,
  endpoint: String,
}

impl HttpObjectStore {
  pub fn new(endpoint: impl Into<String>) -> Result<Self, ArchiveError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(120))
      .build()?;
    Ok(Self { client, endpoint: endpoint.into() })
  }

  fn url(&self, bucket: &str, key: &str) -> String {
    format!(
      "{}/{}/{}",
      self.endpoint.trim_end_matches('/'),
      bucket,
      key.trim_start_matches('/')
    )
  }
}

impl ObjectStore for HttpObjectStore {
  type Error = ArchiveError;

  async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
    let resp = self.client.get(self.url(bucket, key)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let body = resp.error_for_status()?.bytes().await?;
    Ok(Some(body.to_vec()))
  }

  async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ArchiveError> {
    self
      .client
      .put(self.url(bucket, key))
      .body(body)
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// Object store rooted at a local directory: the object `bucket`/`key` lives
/// at `{root}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct DirObjectStore {
  root: PathBuf,
}

impl DirObjectStore {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Resolve `bucket`/`key` under the root, refusing anything that would
  /// escape it.
  pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, ArchiveError> {
    let relative = Path::new(bucket).join(key);
    let contained = !bucket.is_empty()
      && !key.is_empty()
      && relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !contained {
      return Err(ArchiveError::InvalidKey(format!("{bucket}/{key}")));
    }
    Ok(self.root.join(relative))
  }
}

impl ObjectStore for DirObjectStore {
  type Error = ArchiveError;

  async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
    let path = self.object_path(bucket, key)?;
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ArchiveError> {
    let path = self.object_path(bucket, key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    // Write beside the target and rename so readers never see a torn object.
    let partial = path.with_extension("partial");
    tokio::fs::write(&partial, body).await?;
    tokio::fs::rename(&partial, &path).await?;
    Ok(())
  }
}
