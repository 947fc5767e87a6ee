//! Shared in-memory state: the last snapshot of each sensor.

use alert_engine::{Evaluation, SensorKind};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use crate::types::SensorSnapshot;

/// Each sensor has its own lock; the poll task writes, handlers read.
pub struct AppState {
  earthquake: RwLock<SensorSnapshot>,
  tsunami: RwLock<SensorSnapshot>,
}

impl Default for AppState {
  fn default() -> Self {
    Self::new()
  }
}

impl AppState {
  pub fn new() -> Self {
    Self {
      earthquake: RwLock::new(SensorSnapshot::initial(SensorKind::Earthquake)),
      tsunami: RwLock::new(SensorSnapshot::initial(SensorKind::Tsunami)),
    }
  }

  fn slot(&self, sensor: SensorKind) -> &RwLock<SensorSnapshot> {
    match sensor {
      SensorKind::Earthquake => &self.earthquake,
      SensorKind::Tsunami => &self.tsunami,
    }
  }

  /// Replace a sensor's snapshot. Returns true if its on/off state flipped.
  pub async fn record(&self, sensor: SensorKind, evaluation: Evaluation, at: DateTime<Utc>) -> bool {
    let next = SensorSnapshot::from_evaluation(sensor, evaluation, at);
    let mut slot = self.slot(sensor).write().await;
    let flipped = slot.is_on != next.is_on;
    if flipped {
      info!(sensor = sensor.as_str(), is_on = next.is_on, verdict = ?next.verdict, "sensor state changed");
    }
    *slot = next;
    flipped
  }

  pub async fn snapshot(&self, sensor: SensorKind) -> SensorSnapshot {
    self.slot(sensor).read().await.clone()
  }

  pub async fn snapshots(&self) -> Vec<SensorSnapshot> {
    vec![
      self.snapshot(SensorKind::Earthquake).await,
      self.snapshot(SensorKind::Tsunami).await,
    ]
  }
}
