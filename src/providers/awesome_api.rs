use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, instrument};

use crate::core::error::UpstreamError;
use crate::core::quote::{Quote, QuoteSource, pair_key};

/// Client for the AwesomeAPI `json/last/<PAIR>` endpoint.
pub struct AwesomeApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl AwesomeApiProvider {
    pub fn new(base_url: &str) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent("cotacao/0.1")
            .build()?;
        Ok(AwesomeApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn request(&self, pair: &str) -> Result<Quote, UpstreamError> {
        let url = format!("{}/{}", self.base_url, pair);
        debug!("Requesting quote from {}", url);

        let response = self.client.get(&url).send().await?;
        debug!(status = %response.status(), "Received upstream response");

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let body = response.bytes().await?;
        decode_quote(&body, pair)
    }
}

/// Pulls the quote for `pair` out of a payload keyed by pair code.
pub fn decode_quote(body: &[u8], pair: &str) -> Result<Quote, UpstreamError> {
    let mut payload: HashMap<String, Value> =
        serde_json::from_slice(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

    let key = pair_key(pair);
    let item = payload
        .remove(&key)
        .ok_or_else(|| UpstreamError::Decode(format!("no quote found for {key}")))?;

    serde_json::from_value(item).map_err(|e| UpstreamError::Decode(format!("{key}: {e}")))
}

#[async_trait]
impl QuoteSource for AwesomeApiProvider {
    #[instrument(name = "AwesomeApiFetch", skip(self, deadline), fields(pair = %pair))]
    async fn fetch(&self, pair: &str, deadline: Instant) -> Result<Quote, UpstreamError> {
        let budget = deadline.saturating_duration_since(Instant::now());
        match timeout_at(deadline, self.request(pair)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(?budget, "Upstream deadline elapsed");
                Err(UpstreamError::Timeout(budget))
            }
        }
    }
}
