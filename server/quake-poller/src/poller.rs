//! Fixed-interval poll loop: fetch each feed, evaluate, store.

use std::sync::Arc;
use std::time::Duration;

use alert_engine::{AlertEvaluator, Evaluation, Gate};
use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::fetch::FeedClient;
use crate::state::AppState;

/// A feed URL and the evaluator that reads it.
#[derive(Clone)]
pub struct FeedSource {
  pub url: String,
  pub evaluator: Arc<dyn AlertEvaluator>,
}

impl FeedSource {
  pub fn new(url: impl Into<String>, evaluator: Arc<dyn AlertEvaluator>) -> Self {
    Self {
      url: url.into(),
      evaluator,
    }
  }
}

/// Fetch one feed and evaluate it. Transport faults become a safe-off.
pub async fn poll_feed(client: &FeedClient, source: &FeedSource, now: DateTime<Utc>) -> Evaluation {
  let sensor = source.evaluator.sensor();
  match client.fetch(&source.url).await {
    Ok(body) => source.evaluator.evaluate(&body, now),
    Err(e) => {
      warn!(sensor = sensor.as_str(), url = %source.url, error = %e, "feed fetch failed");
      Evaluation::safe_off(Gate::Transport, e.to_string())
    }
  }
}

pub struct Poller {
  client: FeedClient,
  state: Arc<AppState>,
  earthquake: FeedSource,
  tsunami: FeedSource,
}

impl Poller {
  pub fn new(client: FeedClient, state: Arc<AppState>, earthquake: FeedSource, tsunami: FeedSource) -> Self {
    Self {
      client,
      state,
      earthquake,
      tsunami,
    }
  }

  /// Poll both feeds concurrently and record the results.
  pub async fn tick(&self) {
    let now = Utc::now();
    let (quake, tsunami) = tokio::join!(
      poll_feed(&self.client, &self.earthquake, now),
      poll_feed(&self.client, &self.tsunami, now),
    );
    debug!(earthquake = quake.is_on(), tsunami = tsunami.is_on(), "poll tick complete");

    self.state.record(self.earthquake.evaluator.sensor(), quake, now).await;
    self.state.record(self.tsunami.evaluator.sensor(), tsunami, now).await;
  }

  /// Tick forever. The first tick fires immediately.
  pub async fn run(self, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
      interval.tick().await;
      self.tick().await;
    }
  }
}
