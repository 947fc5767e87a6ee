//! One request of the stdin/stdout contract, evaluated without I/O.

use chrono::{DateTime, Utc};

use crate::engine::{EarthquakeEvaluator, TsunamiEvaluator};
use crate::error::RequestError;
use crate::geo::Coordinates;
use crate::types::{Evaluation, EvaluationRequest, SensorKind};

/// Validate the request's setup and evaluate its payload.
///
/// Only setup problems are returned as errors; payload faults are folded into
/// the `Evaluation` like on any other poll.
pub fn process(req: EvaluationRequest) -> Result<Evaluation, RequestError> {
  let now = match &req.now {
    Some(raw) => DateTime::parse_from_rfc3339(raw)
      .map_err(|_| RequestError::InvalidNow(raw.clone()))?
      .with_timezone(&Utc),
    None => Utc::now(),
  };

  match req.sensor {
    SensorKind::Tsunami => Ok(TsunamiEvaluator::new().evaluate_value(req.payload)),
    SensorKind::Earthquake => {
      let setup = req.setup.as_ref().ok_or(RequestError::MissingSetup)?;
      let config = setup.validate(req.home.unwrap_or(Coordinates::new(0.0, 0.0)))?;
      if config.notify_radius_km.is_some() && req.home.is_none() {
        return Err(RequestError::MissingHome);
      }
      Ok(EarthquakeEvaluator::new(config).evaluate_value(req.payload, now))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::Gate;

  fn request(json: &str) -> EvaluationRequest {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn tsunami_needs_no_setup() {
    let req = request(
      r#"{"sensor":"tsunami","payload":{"quakelist":[{"quake":{"info":{"TUNAMI":{"advisory":["Chiba"]}}}}]}}"#,
    );
    assert!(process(req).unwrap().is_on());
  }

  #[test]
  fn earthquake_without_setup_is_rejected() {
    let req = request(r#"{"sensor":"earthquake","payload":{}}"#);
    assert_eq!(process(req).unwrap_err().code(), "setup_required");
  }

  #[test]
  fn setup_faults_surface_with_their_code() {
    let req = request(r#"{"sensor":"earthquake","payload":{},"setup":{"scale":"5","magnitude":"5","consent":true}}"#);
    assert_eq!(process(req).unwrap_err().code(), "only_one_threshold");

    let req = request(r#"{"sensor":"earthquake","payload":{},"setup":{"scale":"5"}}"#);
    assert_eq!(process(req).unwrap_err().code(), "consent_required");
  }

  #[test]
  fn radius_needs_home() {
    let req = request(
      r#"{"sensor":"earthquake","payload":{},"setup":{"scale":"5","notify_radius_km":"50","consent":true}}"#,
    );
    assert_eq!(process(req).unwrap_err().code(), "home_required");
  }

  #[test]
  fn bad_now_is_rejected() {
    let req = request(r#"{"sensor":"tsunami","payload":null,"now":"later"}"#);
    assert_eq!(process(req).unwrap_err().code(), "invalid_now");
  }

  #[test]
  fn earthquake_uses_supplied_now() {
    let req = request(
      r#"{
        "sensor": "earthquake",
        "payload": {"quakelist":[{"quake":{"info":{"JISHIN":{
          "maxscale":"6-","magnitude":"6.5","lat":"35.1","lon":"139.2",
          "occurrence_date":"2025/01/15 19:20:00"}}}}]},
        "setup": {"scale":"5+","consent":true},
        "now": "2025-01-15T10:30:00Z"
      }"#,
    );
    let result = process(req).unwrap();
    assert!(result.is_on());

    let req = request(
      r#"{
        "sensor": "earthquake",
        "payload": {"quakelist":[{"quake":{"info":{"JISHIN":{
          "maxscale":"6-","magnitude":"6.5","lat":"35.1","lon":"139.2",
          "occurrence_date":"2025/01/15 19:20:00"}}}}]},
        "setup": {"scale":"5+","consent":true},
        "now": "2025-01-15T12:30:00+00:00"
      }"#,
    );
    assert_eq!(process(req).unwrap().gate(), Some(Gate::Recency));
  }
}
