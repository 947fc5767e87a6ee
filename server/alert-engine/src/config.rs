//! Alert thresholds and setup-time validation.

use chrono::Duration;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::geo::Coordinates;
use crate::recency::{default_window, SOURCE_ZONE};
use crate::scale::ScaleToken;

/// Magnitudes outside this range are rejected at setup.
pub const MAGNITUDE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// What a bulletin must reach to raise the earthquake alert. Exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
  Scale(ScaleToken),
  Magnitude(f64),
}

/// Poll-time configuration for the earthquake evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeConfig {
  pub threshold: Threshold,
  /// Only alert for epicenters within this many kilometres of `home`.
  pub notify_radius_km: Option<f64>,
  pub home: Coordinates,
  /// IANA zone the feed's timestamps are written in.
  pub source_zone: String,
  /// Bulletins older than this are ignored.
  pub recency_window: Duration,
}

impl EarthquakeConfig {
  pub fn new(threshold: Threshold, home: Coordinates) -> Self {
    Self {
      threshold,
      notify_radius_km: None,
      home,
      source_zone: SOURCE_ZONE.to_string(),
      recency_window: default_window(),
    }
  }

  pub fn with_radius_km(mut self, radius_km: f64) -> Self {
    self.notify_radius_km = Some(radius_km);
    self
  }
}

/// Raw setup form, as entered by the user. Blank fields count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupInput {
  #[serde(default)]
  pub scale: Option<String>,
  #[serde(default)]
  pub magnitude: Option<String>,
  #[serde(default)]
  pub notify_radius_km: Option<String>,
  /// Acknowledgement that notifications are delayed and this is not an
  /// early warning system.
  #[serde(default)]
  pub consent: bool,
}

fn provided(field: &Option<String>) -> Option<&str> {
  field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SetupInput {
  /// Check the form and build the evaluator configuration.
  pub fn validate(&self, home: Coordinates) -> Result<EarthquakeConfig, ConfigError> {
    if !self.consent {
      return Err(ConfigError::ConsentRequired);
    }

    let threshold = match (provided(&self.scale), provided(&self.magnitude)) {
      (Some(_), Some(_)) => return Err(ConfigError::OnlyOneThreshold),
      (None, None) => return Err(ConfigError::ThresholdRequired),
      (Some(scale), None) => Threshold::Scale(validate_scale(scale)?),
      (None, Some(magnitude)) => Threshold::Magnitude(validate_magnitude(magnitude)?),
    };

    let mut config = EarthquakeConfig::new(threshold, home);
    if let Some(radius) = provided(&self.notify_radius_km) {
      // Zero means no radius filter.
      let radius = validate_radius(radius)?;
      if radius > 0.0 {
        config = config.with_radius_km(radius);
      }
    }
    Ok(config)
  }
}

pub fn validate_scale(raw: &str) -> Result<ScaleToken, ConfigError> {
  raw
    .parse()
    .map_err(|_| ConfigError::InvalidScale(raw.to_string()))
}

pub fn validate_magnitude(raw: &str) -> Result<f64, ConfigError> {
  raw
    .parse::<f64>()
    .ok()
    .filter(|m| MAGNITUDE_RANGE.contains(m))
    .ok_or_else(|| ConfigError::InvalidMagnitude(raw.to_string()))
}

pub fn validate_radius(raw: &str) -> Result<f64, ConfigError> {
  raw
    .parse::<f64>()
    .ok()
    .filter(|r| r.is_finite() && *r >= 0.0)
    .ok_or_else(|| ConfigError::InvalidRadius(raw.to_string()))
}
