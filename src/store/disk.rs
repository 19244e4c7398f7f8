use crate::core::error::StoreError;
use crate::core::quote::{Quote, QuoteStore, StoredQuote};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use std::sync::Arc;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

const QUOTES_PARTITION: &str = "quotes";

/// Append-only quote table backed by a fjall keyspace.
///
/// Records are keyed by their identifier and stored as JSON. The partition
/// handle is shared by every request; fjall handles concurrent writers.
#[derive(Clone)]
pub struct DiskQuoteStore {
    keyspace: Arc<Keyspace>,
    quotes: PartitionHandle,
}

impl DiskQuoteStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open quote store at {}", path.display()))?;
        let quotes = keyspace
            .open_partition(QUOTES_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open quotes partition")?;
        debug!("Opened quote store at {}", path.display());

        Ok(Self {
            keyspace: Arc::new(keyspace),
            quotes,
        })
    }

    /// Number of stored quotes. Scans the partition.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.quotes.len()?)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.quotes.is_empty()?)
    }

    pub fn get(&self, id: &str) -> Result<Option<StoredQuote>, StoreError> {
        match self.quotes.get(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn ids(&self) -> Result<Vec<String>, StoreError> {
        self.quotes
            .keys()
            .map(|key| Ok(String::from_utf8_lossy(&key?).into_owned()))
            .collect()
    }

    fn write(&self, record: &StoredQuote) -> Result<(), StoreError> {
        let value = serde_json::to_vec(record)?;
        self.quotes.insert(record.id.as_str(), value)?;
        self.keyspace.persist(PersistMode::Buffer)?;
        debug!(id = %record.id, "Quote PUT");
        Ok(())
    }
}

#[async_trait]
impl QuoteStore for DiskQuoteStore {
    async fn insert(&self, quote: &Quote, deadline: Instant) -> Result<StoredQuote, StoreError> {
        let budget = deadline.saturating_duration_since(Instant::now());
        let record = StoredQuote::new(quote);
        let store = self.clone();

        let task = tokio::task::spawn_blocking(move || {
            // A worker that only gets scheduled after the deadline must not write.
            if Instant::now() >= deadline {
                return Err(StoreError::Timeout(budget));
            }
            store.write(&record).map(|_| record)
        });

        match timeout_at(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(StoreError::Write(join_err.to_string())),
            Err(_) => Err(StoreError::Timeout(budget)),
        }
    }
}
