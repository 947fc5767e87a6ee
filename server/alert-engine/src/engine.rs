//! Core engine: runs a parsed bulletin through the alert gates.
//!
//! Evaluators are stateless. Every call returns a well-formed `Evaluation`;
//! faults become a safe-off verdict naming the gate that stopped the chain.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::debug;

use crate::bulletin::{self, EarthquakeBulletin, ParseOutcome, TsunamiBulletin, TsunamiStatus};
use crate::config::{EarthquakeConfig, Threshold};
use crate::geo;
use crate::recency::{self, Recency};
use crate::scale::ScaleToken;
use crate::types::*;

/// One sensor's evaluation step, as driven by a poll loop.
pub trait AlertEvaluator: Send + Sync {
  fn sensor(&self) -> SensorKind;

  /// Evaluate a raw response body at `now`.
  fn evaluate(&self, body: &[u8], now: DateTime<Utc>) -> Evaluation;
}

fn payload_off<T>(outcome: ParseOutcome<T>) -> Result<T, Evaluation> {
  match outcome {
    ParseOutcome::Parsed(v) => Ok(v),
    ParseOutcome::Empty(reason) => Err(Evaluation::safe_off(Gate::Payload, reason)),
    ParseOutcome::Malformed(reason) => Err(Evaluation::safe_off(
      Gate::Payload,
      format!("malformed payload: {}", reason),
    )),
  }
}

// ---------------------------------------------------------------------------
// Earthquake
// ---------------------------------------------------------------------------

/// Gates, in order: payload, notify radius, scale/magnitude threshold, recency.
#[derive(Debug, Clone)]
pub struct EarthquakeEvaluator {
  config: EarthquakeConfig,
}

impl EarthquakeEvaluator {
  pub fn new(config: EarthquakeConfig) -> Self {
    Self { config }
  }

  /// Evaluate an already-decoded feed document.
  pub fn evaluate_value(&self, payload: Value, now: DateTime<Utc>) -> Evaluation {
    self.evaluate_outcome(bulletin::earthquake_from_value(payload), now)
  }

  pub fn evaluate_outcome(
    &self,
    outcome: ParseOutcome<EarthquakeBulletin>,
    now: DateTime<Utc>,
  ) -> Evaluation {
    let result = payload_off(outcome).and_then(|b| {
      self.radius_gate(&b)?;
      self.threshold_gate(&b)?;
      self.recency_gate(&b, now)?;
      Ok(b)
    });

    match result {
      Ok(b) => {
        debug!(scale = ?b.max_scale, magnitude = ?b.magnitude, "earthquake alert active");
        Evaluation::active(b.info)
      }
      Err(off) => {
        debug!(gate = ?off.gate(), verdict = ?off.verdict, "earthquake alert off");
        off
      }
    }
  }

  fn radius_gate(&self, b: &EarthquakeBulletin) -> Result<(), Evaluation> {
    let Some(radius_km) = self.config.notify_radius_km else {
      return Ok(());
    };
    let Some(epicenter) = b.epicenter else {
      return Err(Evaluation::safe_off(
        Gate::Radius,
        "bulletin has no usable epicenter coordinates",
      ));
    };

    let distance = geo::distance_km(self.config.home, epicenter);
    debug!(distance_km = distance, limit_km = radius_km, "distance to epicenter");
    // Written so that a NaN distance fails the gate.
    if !(distance <= radius_km) {
      return Err(Evaluation::safe_off(
        Gate::Radius,
        format!("epicenter {:.1} km away, limit {:.1} km", distance, radius_km),
      ));
    }
    Ok(())
  }

  fn threshold_gate(&self, b: &EarthquakeBulletin) -> Result<(), Evaluation> {
    match self.config.threshold {
      Threshold::Scale(threshold) => {
        let raw = b.max_scale.as_deref().ok_or_else(|| {
          Evaluation::safe_off(Gate::Threshold, "bulletin has no maxscale")
        })?;
        let value: ScaleToken = raw.parse().map_err(|e| {
          Evaluation::safe_off(Gate::Threshold, format!("scale comparison undetermined: {}", e))
        })?;
        debug!(quake = %value, threshold = %threshold, "scale comparison");
        if !value.at_least(&threshold) {
          return Err(Evaluation::safe_off(
            Gate::Threshold,
            format!("scale {} below threshold {}", value, threshold),
          ));
        }
      }
      Threshold::Magnitude(threshold) => {
        let magnitude = b.magnitude.ok_or_else(|| {
          Evaluation::safe_off(Gate::Threshold, "bulletin has no usable magnitude")
        })?;
        debug!(quake = magnitude, threshold, "magnitude comparison");
        // Written so that a NaN magnitude fails the gate.
        if !(magnitude >= threshold) {
          return Err(Evaluation::safe_off(
            Gate::Threshold,
            format!("magnitude {:.1} below threshold {:.1}", magnitude, threshold),
          ));
        }
      }
    }
    Ok(())
  }

  fn recency_gate(&self, b: &EarthquakeBulletin, now: DateTime<Utc>) -> Result<(), Evaluation> {
    let raw = b
      .occurrence
      .as_deref()
      .ok_or_else(|| Evaluation::safe_off(Gate::Recency, "bulletin has no occurrence_date"))?;

    let checked = recency::parse_occurrence(raw).and_then(|local| {
      recency::check(local, &self.config.source_zone, now, self.config.recency_window)
    });

    match checked {
      Ok(Recency::Recent { age }) => {
        debug!(age_secs = age.num_seconds(), "bulletin is recent");
        Ok(())
      }
      Ok(Recency::Stale { age }) => Err(Evaluation::safe_off(
        Gate::Recency,
        format!("bulletin is {} minutes old", age.num_minutes()),
      )),
      Ok(Recency::Future { ahead }) => Err(Evaluation::safe_off(
        Gate::Recency,
        format!(
          "bulletin is timestamped {} seconds in the future (clock skew)",
          ahead.num_seconds()
        ),
      )),
      Err(e) => Err(Evaluation::safe_off(Gate::Recency, e.to_string())),
    }
  }
}

impl AlertEvaluator for EarthquakeEvaluator {
  fn sensor(&self) -> SensorKind {
    SensorKind::Earthquake
  }

  fn evaluate(&self, body: &[u8], now: DateTime<Utc>) -> Evaluation {
    self.evaluate_outcome(bulletin::parse_earthquake(body), now)
  }
}

// ---------------------------------------------------------------------------
// Tsunami
// ---------------------------------------------------------------------------

/// Active while the feed lists advisory locations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsunamiEvaluator;

impl TsunamiEvaluator {
  pub fn new() -> Self {
    Self
  }

  pub fn evaluate_value(&self, payload: Value) -> Evaluation {
    self.evaluate_outcome(bulletin::tsunami_from_value(payload))
  }

  pub fn evaluate_outcome(&self, outcome: ParseOutcome<TsunamiBulletin>) -> Evaluation {
    let b = match payload_off(outcome) {
      Ok(b) => b,
      Err(off) => return off,
    };

    match b.status {
      TsunamiStatus::Active(locations) => {
        debug!(?locations, "tsunami advisory active");
        let mut attributes = Attributes::new();
        attributes.insert("locations".into(), json!(locations));
        Evaluation::active(attributes)
      }
      TsunamiStatus::Clear => Evaluation::safe_off(Gate::Advisory, "no tsunami warnings active"),
      TsunamiStatus::Unrecognized => {
        Evaluation::safe_off(Gate::Payload, "unrecognized tsunami section")
      }
    }
  }
}

impl AlertEvaluator for TsunamiEvaluator {
  fn sensor(&self) -> SensorKind {
    SensorKind::Tsunami
  }

  fn evaluate(&self, body: &[u8], _now: DateTime<Utc>) -> Evaluation {
    self.evaluate_outcome(bulletin::parse_tsunami(body))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geo::Coordinates;
  use chrono::TimeZone;

  const HOME: Coordinates = Coordinates {
    latitude: 35.0,
    longitude: 139.0,
  };

  // 2025-01-15 10:30 UTC == 19:30 JST.
  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
  }

  fn jishin(scale: &str, magnitude: f64, lat: f64, lon: f64, occurred_jst: &str) -> Value {
    json!({
      "quakelist": [{
        "quake": {
          "info": {
            "JISHIN": {
              "maxscale": scale,
              "magnitude": magnitude,
              "lat": lat,
              "lon": lon,
              "occurrence_date": occurred_jst
            }
          }
        }
      }]
    })
  }

  fn scale_evaluator(threshold: &str) -> EarthquakeEvaluator {
    EarthquakeEvaluator::new(EarthquakeConfig::new(
      Threshold::Scale(threshold.parse().unwrap()),
      HOME,
    ))
  }

  #[test]
  fn all_gates_pass() {
    let eval = scale_evaluator("5+");
    let payload = jishin("6-", 6.2, 35.1, 139.1, "2025/01/15 19:20:00");
    let result = eval.evaluate_value(payload, now());
    assert!(result.is_on());
    assert_eq!(result.verdict, Verdict::Active);
    assert!(result.state.attributes.contains_key("JISHIN"));
  }

  #[test]
  fn empty_payload_stops_at_payload_gate() {
    let eval = scale_evaluator("1");
    let result = eval.evaluate_value(json!({ "quakelist": [] }), now());
    assert!(!result.is_on());
    assert_eq!(result.gate(), Some(Gate::Payload));
    assert!(result.state.attributes.is_empty());
  }

  #[test]
  fn malformed_body_stops_at_payload_gate() {
    let eval = scale_evaluator("1");
    let result = eval.evaluate(b"\x00\x01 not json", now());
    assert_eq!(result.gate(), Some(Gate::Payload));
  }

  #[test]
  fn radius_gate_runs_before_threshold() {
    // Both radius and scale would fail; radius is reported.
    let config = EarthquakeConfig::new(Threshold::Scale("7".parse().unwrap()), HOME).with_radius_km(100.0);
    let eval = EarthquakeEvaluator::new(config);
    let payload = jishin("3", 4.0, 39.5, 139.0, "2025/01/15 19:20:00");
    assert_eq!(eval.evaluate_value(payload, now()).gate(), Some(Gate::Radius));
  }

  #[test]
  fn radius_requires_epicenter() {
    let config = EarthquakeConfig::new(Threshold::Magnitude(3.0), HOME).with_radius_km(500.0);
    let eval = EarthquakeEvaluator::new(config);
    let payload = json!({ "quakelist": [{ "quake": { "info": { "JISHIN": {
      "maxscale": "5", "magnitude": 5.0, "occurrence_date": "2025/01/15 19:20:00"
    } } } }] });
    assert_eq!(eval.evaluate_value(payload, now()).gate(), Some(Gate::Radius));
  }

  #[test]
  fn nan_epicenter_never_passes_radius() {
    let config = EarthquakeConfig::new(Threshold::Scale("3".parse().unwrap()), HOME).with_radius_km(10.0);
    let eval = EarthquakeEvaluator::new(config);
    let payload = json!({ "quakelist": [{ "quake": { "info": { "JISHIN": {
      "maxscale": "6+", "magnitude": 6.5, "lat": "NaN", "lon": "139.0",
      "occurrence_date": "2025/01/15 19:20:00"
    } } } }] });
    let result = eval.evaluate_value(payload, now());
    assert!(!result.is_on());
    assert_eq!(result.gate(), Some(Gate::Radius));
  }

  #[test]
  fn nan_home_fails_radius_gate() {
    let home = Coordinates::new(f64::NAN, 139.0);
    let config = EarthquakeConfig::new(Threshold::Scale("3".parse().unwrap()), home).with_radius_km(10.0);
    let eval = EarthquakeEvaluator::new(config);
    let payload = jishin("6+", 6.5, 35.0, 139.0, "2025/01/15 19:20:00");
    assert_eq!(eval.evaluate_value(payload, now()).gate(), Some(Gate::Radius));
  }

  #[test]
  fn epicenter_inside_radius_passes() {
    let config = EarthquakeConfig::new(Threshold::Magnitude(3.0), HOME).with_radius_km(50.0);
    let eval = EarthquakeEvaluator::new(config);
    let payload = jishin("4", 5.0, 35.2, 139.1, "2025/01/15 19:25:00");
    assert!(eval.evaluate_value(payload, now()).is_on());
  }

  #[test]
  fn malformed_scale_is_undetermined() {
    let eval = scale_evaluator("3");
    for bad in ["5++", "", "8", "不明"] {
      let result = eval.evaluate_value(jishin(bad, 6.0, 35.0, 139.0, "2025/01/15 19:20:00"), now());
      assert!(!result.is_on(), "{:?}", bad);
      assert_eq!(result.gate(), Some(Gate::Threshold));
    }
  }

  #[test]
  fn scale_below_threshold() {
    let eval = scale_evaluator("5");
    let result = eval.evaluate_value(jishin("5-", 6.0, 35.0, 139.0, "2025/01/15 19:20:00"), now());
    assert_eq!(result.gate(), Some(Gate::Threshold));
  }

  #[test]
  fn magnitude_threshold() {
    let eval = EarthquakeEvaluator::new(EarthquakeConfig::new(Threshold::Magnitude(5.0), HOME));
    let below = eval.evaluate_value(jishin("4", 4.0, 35.0, 139.0, "2025/01/15 19:29:00"), now());
    assert_eq!(below.gate(), Some(Gate::Threshold));
    let equal = eval.evaluate_value(jishin("4", 5.0, 35.0, 139.0, "2025/01/15 19:29:00"), now());
    assert!(equal.is_on());
  }

  #[test]
  fn stale_future_and_unparsable_times_stop_at_recency() {
    let eval = scale_evaluator("1");
    for occurred in ["2025/01/15 19:00:00", "2025/01/15 19:35:00", "soon", "2025/02/30 19:20:00"] {
      let result = eval.evaluate_value(jishin("3", 4.0, 35.0, 139.0, occurred), now());
      assert_eq!(result.gate(), Some(Gate::Recency), "{}", occurred);
    }
  }

  #[test]
  fn unknown_source_zone_degrades_to_utc() {
    let mut config = EarthquakeConfig::new(Threshold::Scale("1".parse().unwrap()), HOME);
    config.source_zone = "Nowhere/Atlantis".into();
    let eval = EarthquakeEvaluator::new(config);
    // Read as UTC, 10:25 is five minutes before `now`.
    let result = eval.evaluate_value(jishin("3", 4.0, 35.0, 139.0, "2025/01/15 10:25:00"), now());
    assert!(result.is_on());
  }

  #[test]
  fn tsunami_advisory_and_clear() {
    let eval = TsunamiEvaluator::new();
    let active = eval.evaluate_value(json!({ "quakelist": [{ "quake": { "info": {
      "TUNAMI": { "advisory": ["Tokyo Bay", "Chiba"] }
    } } }] }));
    assert!(active.is_on());
    assert_eq!(active.state.attributes.get("locations"), Some(&json!(["Tokyo Bay", "Chiba"])));

    let clear = eval.evaluate_value(json!({ "quakelist": [{ "quake": { "info": {
      "TUNAMI": { "none": "" }
    } } }] }));
    assert!(!clear.is_on());
    assert_eq!(clear.gate(), Some(Gate::Advisory));
    assert!(clear.state.attributes.is_empty());
  }

  #[test]
  fn tsunami_unknown_shape_is_off() {
    let eval = TsunamiEvaluator::new();
    let result = eval.evaluate(br#"{"quakelist":[{"quake":{"info":{"TUNAMI":{}}}}]}"#, now());
    assert!(!result.is_on());
    assert_eq!(result.gate(), Some(Gate::Payload));
  }

  #[test]
  fn evaluators_report_their_sensor() {
    let evaluators: Vec<Box<dyn AlertEvaluator>> =
      vec![Box::new(scale_evaluator("3")), Box::new(TsunamiEvaluator::new())];
    let kinds: Vec<_> = evaluators.iter().map(|e| e.sensor()).collect();
    assert_eq!(kinds, vec![SensorKind::Earthquake, SensorKind::Tsunami]);
  }
}
