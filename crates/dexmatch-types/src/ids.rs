//! Identifiers used throughout DexMatch.
//!
//! Nothing here is random: an [`OrderId`] is derived from the sender and
//! the sender's transaction sequence, so every node derives the same ID
//! for the same order and sorts IDs the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DexmatchError, Result};

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An on-chain account address (bech32 or any other canonical string form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Order identifier: `(owner, sequence)`.
///
/// Ordering is lexicographic on the owner address, then numeric on the
/// sequence. This ordering is part of the matching tie-break contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId {
    pub owner: AccountId,
    pub sequence: u64,
}

impl OrderId {
    #[must_use]
    pub fn new(owner: AccountId, sequence: u64) -> Self {
        Self { owner, sequence }
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.owner, self.sequence)
    }
}

// ---------------------------------------------------------------------------
// MarketPair
// ---------------------------------------------------------------------------

/// A trading pair `STOCK/MONEY` (e.g., `abc/cet`).
///
/// Bids pay `money` to receive `stock`; asks deliver `stock` to receive `money`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MarketPair {
    pub stock: String,
    pub money: String,
}

impl MarketPair {
    #[must_use]
    pub fn new(stock: impl Into<String>, money: impl Into<String>) -> Self {
        Self {
            stock: stock.into(),
            money: money.into(),
        }
    }

    /// Parse a `STOCK/MONEY` symbol.
    ///
    /// # Errors
    /// Returns [`DexmatchError::MalformedSymbol`] unless the symbol is exactly
    /// two non-empty, whitespace-free denominations separated by one `/`.
    pub fn parse(symbol: &str) -> Result<Self> {
        let malformed = || DexmatchError::MalformedSymbol(symbol.to_string());
        let (stock, money) = symbol.split_once('/').ok_or_else(malformed)?;
        let valid = |denom: &str| {
            !denom.is_empty() && !denom.contains('/') && !denom.chars().any(char::is_whitespace)
        };
        if !valid(stock) || !valid(money) {
            return Err(malformed());
        }
        Ok(Self::new(stock, money))
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.stock, self.money)
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stock, self.money)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
