//! The `ObjectStore` trait: remote storage for database snapshots.

use std::future::Future;

/// Opaque blob storage addressed by bucket and key.
///
/// `put` overwrites whatever is stored at the key; there is no versioning.
pub trait ObjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the object at `bucket`/`key`. A missing object is `Ok(None)`, not
  /// an error.
  fn get<'a>(
    &'a self,
    bucket: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + 'a;

  fn put<'a>(
    &'a self,
    bucket: &'a str,
    key: &'a str,
    body: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
