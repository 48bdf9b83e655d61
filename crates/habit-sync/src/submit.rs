use habit_core::{NewRecord, Record, queue::EventQueue};

use crate::{Error, Result};

/// Validate `new`, stamp it with a fresh id and capture time, and push it onto
/// its kind's queue. Returns the record as queued.
pub async fn submit<Q: EventQueue>(queue: &Q, new: NewRecord) -> Result<Record> {
  new.validate()?;
  let record = new.stamp();
  let raw = record.encode()?;

  queue
    .push(record.kind().queue_name(), raw)
    .await
    .map_err(|e| Error::Queue(Box::new(e)))?;

  tracing::debug!(kind = %record.kind(), id = %record.id(), "record queued");
  Ok(record)
}
