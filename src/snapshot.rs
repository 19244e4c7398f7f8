//! Plain-text snapshot of the last bid served.

use std::path::Path;

use crate::core::quote::Quote;

pub fn snapshot_text(quote: &Quote) -> String {
    format!("Dollar: {}", quote.bid)
}

/// Overwrites `path` with the bid of `quote`.
pub async fn write_snapshot(path: &Path, quote: &Quote) -> std::io::Result<()> {
    tokio::fs::write(path, snapshot_text(quote)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn quote(bid: &str) -> Quote {
        serde_json::from_value(serde_json::json!({
            "code": "USD", "codein": "BRL", "name": "Dólar Americano/Real Brasileiro",
            "high": "5.45", "low": "5.40", "varBid": "0.01", "pctChange": "0.19",
            "bid": bid, "ask": "5.44", "timestamp": "1718035200",
            "create_date": "2024-06-10 13:00:00"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_is_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cotacao.txt");

        write_snapshot(&path, &quote("5.4312")).await.unwrap();
        write_snapshot(&path, &quote("5.43")).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Dollar: 5.43");
    }

    #[tokio::test]
    async fn test_snapshot_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("cotacao.txt");

        assert!(write_snapshot(&path, &quote("5.43")).await.is_err());
    }
}
