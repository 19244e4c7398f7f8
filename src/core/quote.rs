//! Quote types and the abstractions over where quotes come from and go to

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::core::error::{StoreError, UpstreamError};

/// An exchange quote exactly as the upstream API reports it.
///
/// Every numeric field stays a string so the decimal formatting chosen by the
/// upstream survives untouched all the way to the caller and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub code: String,
    pub codein: String,
    pub name: String,
    pub high: String,
    pub low: String,
    #[serde(rename = "varBid")]
    pub var_bid: String,
    #[serde(rename = "pctChange")]
    pub pct_change: String,
    pub bid: String,
    pub ask: String,
    pub timestamp: String,
    pub create_date: String,
}

/// A persisted copy of a [`Quote`] under a freshly generated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuote {
    pub id: String,
    #[serde(flatten)]
    pub quote: Quote,
}

impl StoredQuote {
    pub fn new(quote: &Quote) -> Self {
        StoredQuote {
            id: Uuid::new_v4().to_string(),
            quote: quote.clone(),
        }
    }
}

/// Key the upstream uses for a pair code, e.g. `USD-BRL` -> `USDBRL`.
pub fn pair_key(pair: &str) -> String {
    pair.chars().filter(|c| *c != '-').collect()
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetches the latest quote for `pair`, giving up once `deadline` passes.
    async fn fetch(&self, pair: &str, deadline: Instant) -> Result<Quote, UpstreamError>;
}

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Appends `quote` under a new identifier. Must not outlive `deadline`.
    async fn insert(&self, quote: &Quote, deadline: Instant) -> Result<StoredQuote, StoreError>;
}
