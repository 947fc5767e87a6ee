//! Structured error types for the alert engine.

use thiserror::Error;

/// Faults raised while reading a bulletin. None of these escape an evaluation;
/// the evaluator turns each into a safe-off verdict for the gate that hit it.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("scale: {token:?}: {reason}")]
  Scale { token: String, reason: String },

  #[error("timestamp: {raw:?}: {reason}")]
  Timestamp { raw: String, reason: String },

  #[error("field: {field}: {reason}")]
  Field { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn scale(token: &str, reason: &str) -> Self {
    Self::Scale {
      token: token.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn timestamp(raw: &str, reason: impl Into<String>) -> Self {
    Self::Timestamp {
      raw: raw.to_string(),
      reason: reason.into(),
    }
  }

  pub fn field(field: &str, reason: &str) -> Self {
    Self::Field {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}

/// Setup-time rejections. These are the only faults shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("please acknowledge that this is not an earthquake early warning system; notifications are delayed")]
  ConsentRequired,

  #[error("set either a scale or a magnitude threshold, not both")]
  OnlyOneThreshold,

  #[error("a scale or a magnitude threshold is required")]
  ThresholdRequired,

  #[error("invalid scale value {0:?}: must be a number 1-7 with optional + or - (e.g. 5, 5+, 5-)")]
  InvalidScale(String),

  #[error("invalid magnitude value {0:?}: must be a number between 0 and 10")]
  InvalidMagnitude(String),

  #[error("invalid radius value {0:?}: must be a non-negative number of kilometres")]
  InvalidRadius(String),
}

impl ConfigError {
  /// Stable machine-readable code for the rejection.
  pub fn code(&self) -> &'static str {
    match self {
      Self::ConsentRequired => "consent_required",
      Self::OnlyOneThreshold => "only_one_threshold",
      Self::ThresholdRequired => "threshold_required",
      Self::InvalidScale(_) => "invalid_scale",
      Self::InvalidMagnitude(_) => "invalid_magnitude",
      Self::InvalidRadius(_) => "invalid_radius",
    }
  }
}

/// Rejections for one line of the stdin contract.
#[derive(Debug, Error)]
pub enum RequestError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("earthquake requests need a setup block")]
  MissingSetup,

  #[error("home coordinates are required when notify_radius_km is set")]
  MissingHome,

  #[error("now: invalid RFC3339 timestamp {0:?}")]
  InvalidNow(String),
}

impl RequestError {
  pub fn code(&self) -> &'static str {
    match self {
      Self::Config(e) => e.code(),
      Self::MissingSetup => "setup_required",
      Self::MissingHome => "home_required",
      Self::InvalidNow(_) => "invalid_now",
    }
  }
}
