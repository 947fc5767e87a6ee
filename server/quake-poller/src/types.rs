//! Response types for the sensor API.

use alert_engine::types::Attributes;
use alert_engine::{Evaluation, Gate, SensorKind, Verdict};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Last known state of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
  pub sensor: SensorKind,
  pub is_on: bool,
  pub attributes: Attributes,
  pub verdict: Verdict,
  /// Unset until the first poll completes.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl SensorSnapshot {
  pub fn initial(sensor: SensorKind) -> Self {
    Self {
      sensor,
      is_on: false,
      attributes: Attributes::new(),
      verdict: Verdict::SafeOff {
        gate: Gate::Payload,
        reason: "not polled yet".into(),
      },
      updated_at: None,
    }
  }

  pub fn from_evaluation(sensor: SensorKind, evaluation: Evaluation, at: DateTime<Utc>) -> Self {
    Self {
      sensor,
      is_on: evaluation.state.is_on,
      attributes: evaluation.state.attributes,
      verdict: evaluation.verdict,
      updated_at: Some(at),
    }
  }
}
