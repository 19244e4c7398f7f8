use crate::core::error::StoreError;
use crate::core::quote::{Quote, QuoteStore, StoredQuote};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

/// In-memory quote store, mostly useful for tests
#[derive(Clone, Default)]
pub struct MemoryQuoteStore {
    inner: Arc<Mutex<Vec<StoredQuote>>>,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Copy of everything stored so far, in insertion order.
    pub async fn records(&self) -> Vec<StoredQuote> {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn insert(&self, quote: &Quote, deadline: Instant) -> Result<StoredQuote, StoreError> {
        let budget = deadline.saturating_duration_since(Instant::now());
        let record = StoredQuote::new(quote);

        let mut records = timeout_at(deadline, self.inner.lock())
            .await
            .map_err(|_| StoreError::Timeout(budget))?;
        records.push(record.clone());
        debug!(id = %record.id, "Quote PUT");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    fn quote() -> Quote {
        serde_json::from_str(
            r#"{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro",
                "high":"5.45","low":"5.40","varBid":"0.01","pctChange":"0.19",
                "bid":"5.43","ask":"5.44","timestamp":"1718035200",
                "create_date":"2024-06-10 13:00:00"}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_insert() {
        let store = MemoryQuoteStore::new();
        assert!(store.is_empty().await);

        let deadline = Instant::now() + Duration::from_secs(1);
        let stored = store.insert(&quote(), deadline).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.records().await, vec![stored]);
    }

    #[tokio::test]
    async fn test_memory_store_concurrent_inserts_keep_every_record() {
        let store = MemoryQuoteStore::new();
        let deadline = Instant::now() + Duration::from_secs(5);

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.insert(&quote(), deadline).await.unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let ids: HashSet<String> = store.records().await.into_iter().map(|r| r.id).collect();
        assert_eq!(store.len().await, 32);
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn test_memory_store_times_out_while_locked() {
        let store = MemoryQuoteStore::new();
        let _guard = store.inner.lock().await;

        let result = store
            .insert(&quote(), Instant::now() + Duration::from_millis(10))
            .await;
        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }
}
