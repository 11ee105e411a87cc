//! Balance tracking types for the escrow model.
//!
//! Every account has an `available` balance (spendable) and a `frozen`
//! balance (escrowed against open orders) per denomination.

use serde::{Deserialize, Serialize};

/// A single balance entry for an (account, denom) pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Spendable.
    pub available: u64,
    /// Escrowed for open orders.
    pub frozen: u64,
}

impl BalanceEntry {
    /// Total balance (available + frozen), `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.available.checked_add(self.frozen)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available == 0 && self.frozen == 0
    }
}

/// Token denomination (e.g., `"cet"`, `"abc"`).
pub type Denom = String;
