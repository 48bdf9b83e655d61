//! [`MemoryQueue`]: an in-process stand-in for the Redis transport.

use std::{
  collections::{HashMap, VecDeque},
  convert::Infallible,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use habit_core::queue::EventQueue;

/// Named LIFO lists held in memory. Contents do not survive the process.
///
/// Cloning is cheap and every clone sees the same lists.
#[derive(Clone, Default)]
pub struct MemoryQueue {
  lists: Arc<Mutex<HashMap<String, VecDeque<Vec<u8>>>>>,
}

impl MemoryQueue {
  pub fn new() -> Self { Self::default() }

  /// Number of items waiting in `queue`.
  pub fn len(&self, queue: &str) -> usize {
    self.lock().get(queue).map_or(0, VecDeque::len)
  }

  pub fn is_empty(&self, queue: &str) -> bool { self.len(queue) == 0 }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Vec<u8>>>> {
    self.lists.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl EventQueue for MemoryQueue {
  type Error = Infallible;

  async fn push(&self, queue: &str, item: Vec<u8>) -> Result<(), Infallible> {
    self.lock().entry(queue.to_owned()).or_default().push_front(item);
    Ok(())
  }

  async fn pop(&self, queue: &str) -> Result<Option<Vec<u8>>, Infallible> {
    Ok(self.lock().get_mut(queue).and_then(VecDeque::pop_front))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn pop_returns_most_recent_push_first() {
    let q = MemoryQueue::new();
    q.push("health-triggers", b"a".to_vec()).await.unwrap();
    q.push("health-triggers", b"b".to_vec()).await.unwrap();

    assert_eq!(q.pop("health-triggers").await.unwrap().as_deref(), Some(&b"b"[..]));
    assert_eq!(q.pop("health-triggers").await.unwrap().as_deref(), Some(&b"a"[..]));
    assert_eq!(q.pop("health-triggers").await.unwrap(), None);
  }

  #[tokio::test]
  async fn queues_are_independent() {
    let q = MemoryQueue::new();
    q.push("health-actions", b"x".to_vec()).await.unwrap();

    assert_eq!(q.pop("health-overall").await.unwrap(), None);
    assert_eq!(q.len("health-actions"), 1);
    assert!(q.is_empty("health-overall"));
  }

  #[tokio::test]
  async fn clones_share_contents() {
    let q = MemoryQueue::new();
    let other = q.clone();
    q.push("health-overall", b"{}".to_vec()).await.unwrap();
    assert_eq!(other.len("health-overall"), 1);
  }
}
