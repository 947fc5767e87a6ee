//! Core types for the alert engine (JSON contracts + evaluation results).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::SetupInput;
use crate::geo::Coordinates;

/// Opaque attribute mapping exposed alongside a sensor's boolean state.
pub type Attributes = Map<String, Value>;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
  Earthquake,
  Tsunami,
}

impl SensorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Earthquake => "earthquake",
      Self::Tsunami => "tsunami",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "earthquake" => Some(Self::Earthquake),
      "tsunami" => Some(Self::Tsunami),
      _ => None,
    }
  }
}

// ---------------------------------------------------------------------------
// Evaluation results
// ---------------------------------------------------------------------------

/// Externally visible state of one sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
  pub is_on: bool,
  #[serde(default)]
  pub attributes: Attributes,
}

impl AlertState {
  pub fn off() -> Self {
    Self::default()
  }

  pub fn on(attributes: Attributes) -> Self {
    Self {
      is_on: true,
      attributes,
    }
  }
}

/// The check that stopped an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
  Transport,
  Payload,
  Radius,
  Threshold,
  Recency,
  /// Tsunami feed reports no advisory in force.
  Advisory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
  Active,
  SafeOff { gate: Gate, reason: String },
}

/// Result of one evaluation cycle: the state to publish plus why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
  pub state: AlertState,
  pub verdict: Verdict,
}

impl Evaluation {
  pub fn active(attributes: Attributes) -> Self {
    Self {
      state: AlertState::on(attributes),
      verdict: Verdict::Active,
    }
  }

  pub fn safe_off(gate: Gate, reason: impl Into<String>) -> Self {
    Self {
      state: AlertState::off(),
      verdict: Verdict::SafeOff {
        gate,
        reason: reason.into(),
      },
    }
  }

  pub fn is_on(&self) -> bool {
    self.state.is_on
  }

  /// Gate responsible for a safe-off, if any.
  pub fn gate(&self) -> Option<Gate> {
    match &self.verdict {
      Verdict::Active => None,
      Verdict::SafeOff { gate, .. } => Some(*gate),
    }
  }
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// One inbound line for the stdin binary.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRequest {
  pub sensor: SensorKind,
  /// Upstream response body, as JSON.
  pub payload: Value,
  /// Required for earthquake requests.
  #[serde(default)]
  pub setup: Option<SetupInput>,
  #[serde(default)]
  pub home: Option<Coordinates>,
  /// RFC3339 instant; defaults to the current time.
  #[serde(default)]
  pub now: Option<String>,
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      code: None,
    }
  }

  pub fn with_code(mut self, code: impl Into<String>) -> Self {
    self.code = Some(code.into());
    self
  }
}
