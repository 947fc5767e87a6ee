//! Quake Alert Poller
//!
//! Polls the earthquake and tsunami feeds on a fixed interval, evaluates each
//! body with alert-engine, and serves the latest sensor states over HTTP.
//! Bind to 127.0.0.1 by default (internal only).

pub mod config;
pub mod error;
pub mod fetch;
mod handlers;
pub mod poller;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{Args, PollerConfig};
pub use fetch::FeedClient;
pub use handlers::{health, sensor, sensors};
pub use poller::{FeedSource, Poller};
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/sensors", get(sensors))
    .route("/sensors/:name", get(sensor))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
