//! Error types for the poller.

use alert_engine::ConfigError;
use thiserror::Error;

/// Upstream fetch failures. Each one turns the affected sensor off for the tick.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("http: {0}")]
  Http(#[from] reqwest::Error),

  #[error("upstream returned status {0}")]
  Status(u16),
}

/// Configuration rejected before the service starts.
#[derive(Debug, Error)]
pub enum StartupError {
  #[error("{0} ({code})", code = .0.code())]
  Setup(#[from] ConfigError),

  #[error("--home-lat and --home-lon are required when a notify radius is set")]
  MissingHome,

  #[error("{0} must be greater than zero")]
  ZeroDuration(&'static str),
}
