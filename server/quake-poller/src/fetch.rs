//! HTTP access to the upstream feeds.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;

/// The feed host serves the mobile app; it is sent the same user agent.
pub const USER_AGENT: &str = "okhttp/2.7.5";

/// One GET per call, no retries. A failed fetch waits for the next tick.
#[derive(Debug, Clone)]
pub struct FeedClient {
  http: Client,
}

impl FeedClient {
  pub fn new(timeout: Duration) -> Result<Self, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let http = Client::builder()
      .timeout(timeout)
      .user_agent(USER_AGENT)
      .default_headers(headers)
      .build()?;
    Ok(Self { http })
  }

  /// Fetch a feed body. Non-2xx responses are errors.
  pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = self.http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status(status.as_u16()));
    }
    let body = response.bytes().await?;
    debug!(url, bytes = body.len(), "fetched feed");
    Ok(body.to_vec())
  }
}
