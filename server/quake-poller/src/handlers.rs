//! HTTP handlers for the sensor API.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  Json,
};
use std::sync::Arc;

use alert_engine::SensorKind;

use crate::state::AppState;
use crate::types::SensorSnapshot;

pub async fn health() -> &'static str {
  "ok"
}

pub async fn sensors(State(state): State<Arc<AppState>>) -> Json<Vec<SensorSnapshot>> {
  Json(state.snapshots().await)
}

pub async fn sensor(
  State(state): State<Arc<AppState>>,
  Path(name): Path<String>,
) -> Result<Json<SensorSnapshot>, StatusCode> {
  let kind = SensorKind::from_name(&name).ok_or(StatusCode::NOT_FOUND)?;
  Ok(Json(state.snapshot(kind).await))
}
