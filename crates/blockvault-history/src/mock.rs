//! Fixture-backed history source
//!
//! Mirrors what an EVM indexer would return for a small wallet: one loan
//! repayment into a lending pool and one unrelated swap. The raw fixtures
//! carry full calldata so the shaping path is exercised end to end.

use async_trait::async_trait;
use blockvault_types::{TxRecord, WalletAddress};
use serde_json::json;

use crate::shape::shape_evm_transaction;
use crate::{HistorySource, Result};

/// A history source that serves canned EVM-shaped records
#[derive(Debug, Clone, Default)]
pub struct MockHistorySource;

impl MockHistorySource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HistorySource for MockHistorySource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recent_transactions(
        &self,
        _address: &WalletAddress,
        limit: usize,
    ) -> Result<Vec<TxRecord>> {
        let raw = vec![
            json!({
                "hash": "0x3e1f09a24b8c5de1f80f1f6b0a52f8f4e8f4f1c4a1b2c3d4e5f60718293a4b5c",
                "blockNumber": "0x12a0234",
                "from": "0x123abc456def78901234567890abcdef12345678",
                "to": "0xAavePool00000000000000000000000000000001",
                "value": "1000000000000000000",
                "input": "0x573ade81000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                "method": "repayLoan",
                "timestamp": 1709214000
            }),
            json!({
                "hash": "0x9c4b17d2e3a0f6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d1e0f9a8b7c6d5e4f3a2b1",
                "blockNumber": "0x128b9aa",
                "from": "0x123abc456def78901234567890abcdef12345678",
                "to": "0xUniswapRouter000000000000000000000000002",
                "value": "500000000000000000",
                "input": "0x38ed1739000000000000000000000000000000000000000000000000016345785d8a0000",
                "method": "swap",
                "timestamp": 1708102000
            }),
        ];

        Ok(raw
            .iter()
            .take(limit)
            .map(shape_evm_transaction)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_shaped_records() {
        let source = MockHistorySource::new();
        let address = WalletAddress::new("0x123abc456def78901234567890abcdef12345678").unwrap();

        let records = source.recent_transactions(&address, 20).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].field("method").and_then(|v| v.as_str()),
            Some("repayLoan")
        );
        // Calldata is truncated to the selector
        assert_eq!(
            records[0].field("input_selector").and_then(|v| v.as_str()),
            Some("0x573ade81")
        );
        assert!(records[0].field("input").is_none());
    }

    #[tokio::test]
    async fn test_mock_respects_limit() {
        let source = MockHistorySource::new();
        let address = WalletAddress::new("0xabc").unwrap();

        let records = source.recent_transactions(&address, 1).await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
