//! BlockVault History - transaction-history sources
//!
//! The oracle consumes history as a black box: anything that can produce an
//! ordered sequence of [`TxRecord`]s for an address qualifies. This crate
//! ships a fixture-backed mock (tests, demos) and a thin client for a
//! public Algorand-style indexer. Neither is an indexing engine — real
//! chain indexing is out of scope by design.

pub mod indexer;
pub mod mock;
pub mod shape;

pub use indexer::*;
pub use mock::*;
pub use shape::*;

use async_trait::async_trait;
use blockvault_types::{AddressError, TxRecord, WalletAddress};
use thiserror::Error;

/// Errors that can occur fetching history
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("No transactions available")]
    NoTransactions,

    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// A source of recent transaction history for a wallet
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch up to `limit` recent transactions for an address, newest first
    async fn recent_transactions(
        &self,
        address: &WalletAddress,
        limit: usize,
    ) -> Result<Vec<TxRecord>>;
}
