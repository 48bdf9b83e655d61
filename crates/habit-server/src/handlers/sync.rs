//! Handler for the sync trigger.

use axum::{Json, extract::State};
use habit_core::{archive::ObjectStore, queue::EventQueue};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// `GET /sink` runs one sync cycle, waiting for any cycle already running.
pub async fn sink<Q, O>(State(state): State<AppState<Q, O>>) -> Result<Json<Value>, ApiError>
where
  Q: EventQueue,
  O: ObjectStore,
{
  let syncer = state.syncer.lock().await;
  match syncer.run_cycle().await {
    Ok(report) => Ok(Json(json!({
      "message":        "Refreshed database",
      "schema_created": report.schema_created,
      "inserted":       report.inserted,
    }))),
    Err(e) => {
      tracing::error!(error = %e, "sync cycle failed");
      Err(ApiError::Internal("Failed to refresh database".to_string()))
    }
  }
}
