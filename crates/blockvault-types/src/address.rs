//! Wallet address type
//!
//! Addresses are opaque to the oracle: an Ethereum hex address, an Algorand
//! base32 address, or anything else a history source understands. The only
//! invariant enforced here is non-emptiness.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur constructing an address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("wallet address must not be empty")]
    Empty,
}

/// An opaque, non-empty wallet identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a new address, rejecting empty or whitespace-only input
    pub fn new(address: impl Into<String>) -> Result<Self, AddressError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(AddressError::Empty);
        }
        Ok(Self(address))
    }

    /// Get the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WalletAddress> for String {
    fn from(address: WalletAddress) -> Self {
        address.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
