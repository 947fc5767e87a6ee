//! Binary entrypoint for the quake poller.

use std::sync::Arc;

use alert_engine::{EarthquakeEvaluator, TsunamiEvaluator};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quake_poller::{AppState, Args, FeedClient, FeedSource, PollerConfig, Poller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let config = PollerConfig::from_args(&args)?;
  info!(
    threshold = ?config.earthquake.threshold,
    radius_km = ?config.earthquake.notify_radius_km,
    interval_secs = config.interval.as_secs(),
    "starting quake poller"
  );

  let state = Arc::new(AppState::new());
  let client = FeedClient::new(config.timeout)?;
  let poller = Poller::new(
    client,
    state.clone(),
    FeedSource::new(config.quake_url, Arc::new(EarthquakeEvaluator::new(config.earthquake))),
    FeedSource::new(config.tsunami_url, Arc::new(TsunamiEvaluator::new())),
  );
  tokio::spawn(poller.run(config.interval));

  let app = quake_poller::router(state);
  let listener = tokio::net::TcpListener::bind(config.bind).await?;
  info!("quake-poller listening on http://{}", config.bind);
  axum::serve(listener, app).await?;

  Ok(())
}
