//! Popping every pending item of one kind off its queue.

use habit_core::{Kind, Record, queue::EventQueue};

use crate::{Error, Result};

/// Pop items from `kind`'s queue until it is empty, parsing each as `kind`.
///
/// The first item that fails to parse ends the drain just like an empty
/// queue: the records parsed so far are returned, the bad item is already
/// gone, and everything behind it stays queued for a later cycle. Only a
/// transport failure is an error.
pub async fn drain<Q: EventQueue>(queue: &Q, kind: Kind) -> Result<Vec<Record>> {
  let name = kind.queue_name();
  let mut records = Vec::new();

  while let Some(raw) = queue
    .pop(name)
    .await
    .map_err(|e| Error::Queue(Box::new(e)))?
  {
    match Record::decode(kind, &raw) {
      Ok(record) => records.push(record),
      Err(e) => {
        tracing::warn!(
          %kind,
          queue = name,
          drained = records.len(),
          error = %e,
          "malformed item ends drain; later items stay queued"
        );
        break;
      }
    }
  }

  Ok(records)
}
