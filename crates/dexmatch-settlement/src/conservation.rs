//! Supply conservation checks.
//!
//! ```text
//! ∀ denom: Σ(available + frozen) == Σ(deposits) − Σ(withdrawals)
//! ```
//!
//! Settlement and release only move funds between accounts and between the
//! available and frozen buckets, so the per-denom total must never change
//! across a block. A mismatch is a fatal invariant violation.

use std::collections::BTreeMap;

use dexmatch_types::{Denom, DexmatchError, Result};

/// Expected per-denom supply, tracked from the deposits and withdrawals the
/// host reports.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    deposits: BTreeMap<Denom, u64>,
    withdrawals: BTreeMap<Denom, u64>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deposit(&mut self, denom: &str, amount: u64) -> Result<()> {
        add(&mut self.deposits, denom, amount)
    }

    pub fn record_withdrawal(&mut self, denom: &str, amount: u64) -> Result<()> {
        add(&mut self.withdrawals, denom, amount)
    }

    /// Deposits minus withdrawals; `None` if more was withdrawn than deposited.
    #[must_use]
    pub fn expected_supply(&self, denom: &str) -> Option<u64> {
        let deposited = self.deposits.get(denom).copied().unwrap_or(0);
        let withdrawn = self.withdrawals.get(denom).copied().unwrap_or(0);
        deposited.checked_sub(withdrawn)
    }

    /// # Errors
    /// [`DexmatchError::InvariantViolation`] if `actual` differs from
    /// [`Self::expected_supply`].
    pub fn verify(&self, denom: &str, actual: u64) -> Result<()> {
        match self.expected_supply(denom) {
            Some(expected) if expected == actual => Ok(()),
            expected => Err(DexmatchError::invariant(format!(
                "supply of {denom} is {actual}, expected {expected:?}"
            ))),
        }
    }

    /// Verify every denom ever deposited. `supply_of` reads the ledger total.
    pub fn verify_all(&self, mut supply_of: impl FnMut(&str) -> Result<u64>) -> Result<()> {
        for denom in self.deposits.keys() {
            self.verify(denom, supply_of(denom)?)?;
        }
        Ok(())
    }

    /// Denoms with recorded activity, in sorted order.
    pub fn tracked_denoms(&self) -> impl Iterator<Item = &str> {
        self.deposits.keys().map(String::as_str)
    }
}

fn add(totals: &mut BTreeMap<Denom, u64>, denom: &str, amount: u64) -> Result<()> {
    let total = totals.entry(denom.to_string()).or_insert(0);
    *total = total
        .checked_add(amount)
        .ok_or_else(|| DexmatchError::BalanceOverflow { denom: denom.to_string() })?;
    Ok(())
}
