//! Per-request pipeline behind `GET /cotacao`.
//!
//! Each request gets an outer deadline that bounds the upstream fetch, the
//! snapshot write and the final answer. The store write gets its own, much
//! shorter deadline measured from when persistence starts. It is not clipped
//! to what is left of the outer deadline, so a store write can still be in
//! time while the request as a whole is already late.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, instrument, warn};

use crate::core::config::{AppConfig, PersistencePolicy};
use crate::core::error::{CotacaoError, StoreError, UpstreamError};
use crate::core::quote::{Quote, QuoteSource, QuoteStore};
use crate::snapshot;

/// The only pair this service quotes.
pub const PAIR: &str = "USD-BRL";

pub struct QuoteOrchestrator {
    source: Arc<dyn QuoteSource>,
    store: Arc<dyn QuoteStore>,
    snapshot_path: PathBuf,
    request_budget: Duration,
    store_budget: Duration,
    persistence: PersistencePolicy,
}

impl QuoteOrchestrator {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        store: Arc<dyn QuoteStore>,
        config: &AppConfig,
    ) -> Self {
        QuoteOrchestrator {
            source,
            store,
            snapshot_path: config.snapshot_path.clone(),
            request_budget: config.budgets.request(),
            store_budget: config.budgets.store(),
            persistence: config.persistence,
        }
    }

    /// Fetches, stores and snapshots the quote, returning it only if the
    /// request is still within its outer deadline.
    #[instrument(name = "Cotacao", skip(self))]
    pub async fn handle(&self) -> Result<Quote, CotacaoError> {
        let started = Instant::now();
        let deadline = started + self.request_budget;

        let quote = self.fetch(deadline).await?;
        debug!(bid = %quote.bid, elapsed = ?started.elapsed(), "Quote fetched");

        let stored = self.persist(&quote).await;

        match timeout_at(
            deadline,
            snapshot::write_snapshot(&self.snapshot_path, &quote),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(path = %self.snapshot_path.display(), error = %e, "Snapshot write failed");
                return Err(CotacaoError::SnapshotWriteFailure(format!(
                    "{}: {e}",
                    self.snapshot_path.display()
                )));
            }
            Err(_) => return Err(self.deadline_exceeded(started)),
        }

        stored?;

        if Instant::now() >= deadline {
            return Err(self.deadline_exceeded(started));
        }

        info!(bid = %quote.bid, elapsed = ?started.elapsed(), "Quote served");
        Ok(quote)
    }

    async fn fetch(&self, deadline: Instant) -> Result<Quote, CotacaoError> {
        let result = match timeout_at(deadline, self.source.fetch(PAIR, deadline)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.request_budget)),
        };

        result.map_err(|e| match e {
            UpstreamError::Timeout(_) => {
                warn!(budget = ?self.request_budget, "Upstream quote timed out");
                CotacaoError::UpstreamTimeout(self.request_budget)
            }
            other => {
                error!(error = %other, "Upstream quote failed");
                other.into()
            }
        })
    }

    /// Stores the quote under its own deadline and applies the persistence policy.
    async fn persist(&self, quote: &Quote) -> Result<(), CotacaoError> {
        let deadline = Instant::now() + self.store_budget;
        let result = match timeout_at(deadline, self.store.insert(quote, deadline)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.store_budget)),
        };

        match (result, self.persistence) {
            (Ok(stored), _) => {
                debug!(id = %stored.id, "Quote stored");
                Ok(())
            }
            (Err(e), PersistencePolicy::BestEffort) => {
                warn!(error = %e, "Quote not stored, serving it anyway");
                Ok(())
            }
            (Err(e), PersistencePolicy::Required) => {
                error!(error = %e, "Quote not stored");
                Err(e.into())
            }
        }
    }

    fn deadline_exceeded(&self, started: Instant) -> CotacaoError {
        warn!(
            budget = ?self.request_budget,
            elapsed = ?started.elapsed(),
            "Request deadline exceeded, dropping response"
        );
        CotacaoError::OuterDeadlineExceeded(self.request_budget)
    }
}
