//! Tolerant extraction of bulletins from upstream feed payloads.
//!
//! Both feeds share one envelope: `quakelist[0].quake.info.<SECTION>`, where
//! the section is `JISHIN` (earthquake) or `TUNAMI` (tsunami). Any part of the
//! envelope may be missing or mistyped; nothing here panics and every gap maps
//! to a tagged outcome the evaluator treats as "not active".

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::geo::Coordinates;
use crate::types::Attributes;

pub const EARTHQUAKE_SECTION: &str = "JISHIN";
pub const TSUNAMI_SECTION: &str = "TUNAMI";

/// Result of reading one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
  Parsed(T),
  /// No current data. Not an error.
  Empty(String),
  /// The payload could not be read.
  Malformed(String),
}


// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Feed {
  #[serde(default)]
  quakelist: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
  #[serde(default)]
  quake: Option<QuakeEnvelope>,
}

#[derive(Debug, Deserialize)]
struct QuakeEnvelope {
  #[serde(default)]
  info: Option<Attributes>,
}

/// The `info` object of the newest entry plus the requested section within it.
#[derive(Debug, Clone, PartialEq)]
struct Section {
  info: Attributes,
  body: Value,
}

fn decode(body: &[u8]) -> Result<Value, EngineError> {
  Ok(serde_json::from_slice(body)?)
}

fn malformed<T>(err: EngineError) -> ParseOutcome<T> {
  ParseOutcome::Malformed(err.to_string())
}

fn extract_section(payload: Value, section: &str) -> ParseOutcome<Section> {
  if payload.is_null() {
    return ParseOutcome::Empty("empty response".into());
  }
  if !payload.is_object() {
    return malformed(EngineError::field("(root)", "top level is not an object"));
  }

  let feed: Feed = match serde_json::from_value(payload) {
    Ok(f) => f,
    Err(e) => return malformed(EngineError::field("quakelist", &e.to_string())),
  };

  let first = match feed.quakelist.and_then(|list| list.into_iter().next()) {
    Some(v) => v,
    None => return ParseOutcome::Empty("no entries in quakelist".into()),
  };

  let entry: FeedEntry = match serde_json::from_value(first) {
    Ok(e) => e,
    Err(e) => return malformed(EngineError::field("quakelist[0]", &e.to_string())),
  };

  let info = match entry.quake.and_then(|q| q.info) {
    Some(info) => info,
    None => return ParseOutcome::Empty("first entry has no quake info".into()),
  };

  // Cloned rather than removed: the section stays part of the published attributes.
  match info.get(section).cloned() {
    Some(body) => ParseOutcome::Parsed(Section { info, body }),
    None => ParseOutcome::Empty(format!("no {} section", section)),
  }
}

fn log_gap<T>(outcome: &ParseOutcome<T>, feed: &str) {
  match outcome {
    ParseOutcome::Parsed(_) => {}
    ParseOutcome::Empty(reason) => debug!(feed, reason = %reason, "no current bulletin"),
    ParseOutcome::Malformed(reason) => warn!(feed, reason = %reason, "malformed bulletin payload"),
  }
}

fn undecodable<T>(err: EngineError, feed: &str) -> ParseOutcome<T> {
  let outcome = malformed(err);
  log_gap(&outcome, feed);
  outcome
}

// ---------------------------------------------------------------------------
// Loose scalar access
// ---------------------------------------------------------------------------

/// A finite number, or a string holding one. Upstream mixes both.
fn loose_f64(value: Option<&Value>) -> Option<f64> {
  let parsed = match value? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  parsed.filter(|v| v.is_finite())
}

/// A string, or a bare integer rendered as one.
fn loose_text(value: Option<&Value>) -> Option<String> {
  match value? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

// ---------------------------------------------------------------------------
// Earthquake
// ---------------------------------------------------------------------------

/// Fields of one `JISHIN` section. Scalars are kept as found; each gate
/// validates only what it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeBulletin {
  /// Raw maximum intensity token, e.g. "5+".
  pub max_scale: Option<String>,
  pub magnitude: Option<f64>,
  pub epicenter: Option<Coordinates>,
  /// Raw occurrence time, local to the source zone.
  pub occurrence: Option<String>,
  /// The whole `info` object, published as attributes when the alert fires.
  pub info: Attributes,
}

pub fn earthquake_from_value(payload: Value) -> ParseOutcome<EarthquakeBulletin> {
  let outcome = match extract_section(payload, EARTHQUAKE_SECTION) {
    ParseOutcome::Parsed(section) => match section.body {
      Value::Object(jishin) => {
        let epicenter = match (loose_f64(jishin.get("lat")), loose_f64(jishin.get("lon"))) {
          (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
          _ => None,
        };
        ParseOutcome::Parsed(EarthquakeBulletin {
          max_scale: loose_text(jishin.get("maxscale")),
          magnitude: loose_f64(jishin.get("magnitude")),
          epicenter,
          occurrence: loose_text(jishin.get("occurrence_date")),
          info: section.info,
        })
      }
      other => malformed(EngineError::field(
        EARTHQUAKE_SECTION,
        &format!("expected an object, found {}", other),
      )),
    },
    ParseOutcome::Empty(r) => ParseOutcome::Empty(r),
    ParseOutcome::Malformed(r) => ParseOutcome::Malformed(r),
  };
  log_gap(&outcome, "earthquake");
  if let ParseOutcome::Parsed(b) = &outcome {
    debug!(
      scale = ?b.max_scale,
      magnitude = ?b.magnitude,
      occurrence = ?b.occurrence,
      "earthquake bulletin"
    );
  }
  outcome
}

/// Read an earthquake feed response body.
pub fn parse_earthquake(body: &[u8]) -> ParseOutcome<EarthquakeBulletin> {
  match decode(body) {
    Ok(v) => earthquake_from_value(v),
    Err(e) => undecodable(e, "earthquake"),
  }
}

// ---------------------------------------------------------------------------
// Tsunami
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsunamiStatus {
  /// An advisory is in force for these locations.
  Active(Vec<String>),
  /// The feed carries the explicit "no warnings" marker.
  Clear,
  /// Neither marker present.
  Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsunamiBulletin {
  pub status: TsunamiStatus,
}

fn advisory_locations(value: &Value) -> Option<Vec<String>> {
  match value {
    Value::Array(items) => Some(
      items
        .iter()
        .map(|item| match item {
          Value::String(s) => s.clone(),
          other => other.to_string(),
        })
        .collect(),
    ),
    Value::String(s) => Some(vec![s.clone()]),
    _ => None,
  }
}

pub fn tsunami_from_value(payload: Value) -> ParseOutcome<TsunamiBulletin> {
  let outcome = match extract_section(payload, TSUNAMI_SECTION) {
    ParseOutcome::Parsed(section) => match section.body {
      Value::Object(tunami) => {
        let status = if let Some(advisory) = tunami.get("advisory") {
          match advisory_locations(advisory) {
            Some(locations) => TsunamiStatus::Active(locations),
            None => {
              warn!(advisory = %advisory, "tsunami advisory is neither a list nor a string");
              TsunamiStatus::Unrecognized
            }
          }
        } else if tunami.contains_key("none") {
          TsunamiStatus::Clear
        } else {
          warn!(section = ?tunami, "unexpected tsunami data format");
          TsunamiStatus::Unrecognized
        };
        ParseOutcome::Parsed(TsunamiBulletin { status })
      }
      other => malformed(EngineError::field(
        TSUNAMI_SECTION,
        &format!("expected an object, found {}", other),
      )),
    },
    ParseOutcome::Empty(r) => ParseOutcome::Empty(r),
    ParseOutcome::Malformed(r) => ParseOutcome::Malformed(r),
  };
  log_gap(&outcome, "tsunami");
  outcome
}

/// Read a tsunami feed response body.
pub fn parse_tsunami(body: &[u8]) -> ParseOutcome<TsunamiBulletin> {
  match decode(body) {
    Ok(v) => tsunami_from_value(v),
    Err(e) => undecodable(e, "tsunami"),
  }
}
