//! Command-line / environment configuration for the poller.

use std::net::SocketAddr;
use std::time::Duration;

use alert_engine::{Coordinates, EarthquakeConfig, SetupInput};
use clap::Parser;

use crate::error::StartupError;

pub const QUAKE_URL: &str = "http://support.rcsc.co.jp/list/quake.json";
pub const TSUNAMI_URL: &str = "http://support.rcsc.co.jp/list/tsunami_only.json";

#[derive(Debug, Clone, Parser)]
#[command(name = "quake-poller")]
#[command(about = "Poll Japanese earthquake/tsunami feeds and expose alert states")]
pub struct Args {
  /// JMA intensity threshold, 1-7 with optional + or - (exclusive with --magnitude)
  #[arg(long, env = "QUAKE_SCALE")]
  pub scale: Option<String>,

  /// Magnitude threshold, 0-10 (exclusive with --scale)
  #[arg(long, env = "QUAKE_MAGNITUDE")]
  pub magnitude: Option<String>,

  /// Only alert for epicenters within this many kilometres of home
  #[arg(long, env = "QUAKE_RADIUS_KM")]
  pub radius_km: Option<String>,

  /// Home latitude in decimal degrees
  #[arg(long, env = "HOME_LAT", allow_hyphen_values = true)]
  pub home_lat: Option<f64>,

  /// Home longitude in decimal degrees
  #[arg(long, env = "HOME_LON", allow_hyphen_values = true)]
  pub home_lon: Option<f64>,

  /// Acknowledge this is not an earthquake early warning system; notifications are delayed
  #[arg(long, env = "QUAKE_ACCEPT_DELAY_NOTICE")]
  pub accept_delay_notice: bool,

  /// HTTP port for the sensor API
  #[arg(long, env = "PORT", default_value_t = 5005)]
  pub port: u16,

  /// Seconds between polls
  #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 60)]
  pub interval_secs: u64,

  /// Upstream request timeout in seconds
  #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
  pub timeout_secs: u64,

  /// Earthquake feed URL
  #[arg(long, env = "QUAKE_URL", default_value = QUAKE_URL)]
  pub quake_url: String,

  /// Tsunami feed URL
  #[arg(long, env = "TSUNAMI_URL", default_value = TSUNAMI_URL)]
  pub tsunami_url: String,
}

/// Validated settings the service runs with.
#[derive(Debug, Clone)]
pub struct PollerConfig {
  pub earthquake: EarthquakeConfig,
  pub quake_url: String,
  pub tsunami_url: String,
  pub interval: Duration,
  pub timeout: Duration,
  pub bind: SocketAddr,
}

impl PollerConfig {
  pub fn from_args(args: &Args) -> Result<Self, StartupError> {
    let setup = SetupInput {
      scale: args.scale.clone(),
      magnitude: args.magnitude.clone(),
      notify_radius_km: args.radius_km.clone(),
      consent: args.accept_delay_notice,
    };

    let home = match (args.home_lat, args.home_lon) {
      (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
      _ => None,
    };
    let earthquake = setup.validate(home.unwrap_or(Coordinates::new(0.0, 0.0)))?;
    if earthquake.notify_radius_km.is_some() && home.is_none() {
      return Err(StartupError::MissingHome);
    }

    if args.interval_secs == 0 {
      return Err(StartupError::ZeroDuration("--interval-secs"));
    }
    if args.timeout_secs == 0 {
      return Err(StartupError::ZeroDuration("--timeout-secs"));
    }

    Ok(Self {
      earthquake,
      quake_url: args.quake_url.clone(),
      tsunami_url: args.tsunami_url.clone(),
      interval: Duration::from_secs(args.interval_secs),
      timeout: Duration::from_secs(args.timeout_secs),
      bind: SocketAddr::from(([127, 0, 0, 1], args.port)),
    })
  }
}
