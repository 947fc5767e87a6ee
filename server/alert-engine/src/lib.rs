//! Quake Alert Evaluation Engine — deterministic, rule-based.
//!
//! Reads Japanese earthquake/tsunami feed payloads, gates earthquake bulletins
//! on distance, intensity or magnitude, and recency, and reports whether each
//! alert is currently active.
//!
//! No network, no persistence; pure computation.

pub mod bulletin;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod recency;
pub mod request;
pub mod scale;
pub mod types;

pub use config::{EarthquakeConfig, SetupInput, Threshold};
pub use engine::{AlertEvaluator, EarthquakeEvaluator, TsunamiEvaluator};
pub use error::{ConfigError, EngineError, RequestError};
pub use geo::Coordinates;
pub use types::{AlertState, Evaluation, Gate, SensorKind, Verdict};
