//! The `EventQueue` trait: the transport records wait in between submission
//! and a sync cycle.

use std::future::Future;

/// A set of named last-in-first-out lists of serialized items. Items are raw
/// bytes; the queue never checks that they are UTF-8 or JSON.
///
/// There is no peek and no transactional pop: an item returned by
/// [`pop`](EventQueue::pop) is gone from the queue whatever the caller does
/// with it next.
pub trait EventQueue: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Push one serialized item onto the head of `queue`.
  fn push<'a>(
    &'a self,
    queue: &'a str,
    item: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove and return the head of `queue`, or `None` if it is empty.
  fn pop<'a>(
    &'a self,
    queue: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + 'a;
}
