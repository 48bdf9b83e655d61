//! Handlers for the event submission endpoints.
//!
//! Each accepts one payload, applies the minimal shape check, stamps it and
//! pushes it onto its kind's queue. Nothing touches the database here.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use habit_core::{
  NewRecord,
  archive::ObjectStore,
  queue::EventQueue,
  record::{NewAction, NewOverall, NewTrigger},
};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// `POST /triggers/add`
pub async fn add_trigger<Q, O>(
  State(state): State<AppState<Q, O>>,
  body: Result<Json<NewTrigger>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  Q: EventQueue,
  O: ObjectStore,
{
  let Json(body) = body.map_err(invalid)?;
  enqueue(state.queue.as_ref(), NewRecord::Trigger(body)).await
}

/// `POST /actions/add`
pub async fn add_action<Q, O>(
  State(state): State<AppState<Q, O>>,
  body: Result<Json<NewAction>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  Q: EventQueue,
  O: ObjectStore,
{
  let Json(body) = body.map_err(invalid)?;
  enqueue(state.queue.as_ref(), NewRecord::Action(body)).await
}

/// `POST /overall/add`
pub async fn add_overall<Q, O>(
  State(state): State<AppState<Q, O>>,
  body: Result<Json<NewOverall>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  Q: EventQueue,
  O: ObjectStore,
{
  let Json(body) = body.map_err(invalid)?;
  enqueue(state.queue.as_ref(), NewRecord::Overall(body)).await
}

fn invalid(rejection: JsonRejection) -> ApiError {
  tracing::debug!(error = %rejection, "rejected request body");
  ApiError::BadRequest("Invalid request data".to_string())
}

async fn enqueue<Q: EventQueue>(queue: &Q, new: NewRecord) -> Result<Json<Value>, ApiError> {
  let kind = new.kind();
  match habit_sync::submit(queue, new).await {
    Ok(record) => Ok(Json(json!({
      "message": format!("{} logged successfully", kind.label()),
      "id": record.id(),
    }))),
    Err(habit_sync::Error::Record(e)) => Err(ApiError::BadRequest(e.to_string())),
    Err(e) => {
      tracing::error!(%kind, error = %e, "failed to queue record");
      Err(ApiError::Internal(format!("Failed to log {}", kind.label())))
    }
  }
}
