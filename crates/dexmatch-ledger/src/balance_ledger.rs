//! Balance ledger with available/frozen accounting.
//!
//! Tracks per-(account, denom) balances. Every mutation is all-or-nothing:
//! amounts are checked before anything is written, so a failed call leaves
//! the ledger unchanged. Storage is a `BTreeMap` so iteration (supply sums,
//! dumps) is identical on every node.

use std::collections::BTreeMap;

use dexmatch_types::{AccountId, BalanceEntry, Denom, DexmatchError, EscrowLedger, Result};

/// In-memory [`EscrowLedger`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceLedger {
    balances: BTreeMap<(AccountId, Denom), BalanceEntry>,
}

impl BalanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to the owner's available balance.
    ///
    /// # Errors
    /// [`DexmatchError::BalanceOverflow`] if the balance would exceed `u64::MAX`.
    pub fn deposit(&mut self, owner: &AccountId, denom: &str, amount: u64) -> Result<()> {
        let entry = self.entry_mut(owner, denom);
        entry.available = entry
            .available
            .checked_add(amount)
            .ok_or_else(|| DexmatchError::BalanceOverflow { denom: denom.to_string() })?;
        Ok(())
    }

    /// Balance for an (account, denom) pair; zero if never touched.
    #[must_use]
    pub fn balance(&self, owner: &AccountId, denom: &str) -> BalanceEntry {
        self.balances
            .get(&(owner.clone(), denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of available plus frozen across all accounts.
    ///
    /// # Errors
    /// [`DexmatchError::BalanceOverflow`] if the sum exceeds `u64::MAX`.
    pub fn total_supply(&self, denom: &str) -> Result<u64> {
        let overflow = || DexmatchError::BalanceOverflow { denom: denom.to_string() };
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .try_fold(0u64, |sum, (_, entry)| {
                entry.total().and_then(|t| sum.checked_add(t)).ok_or_else(overflow)
            })
    }

    /// Total frozen for `denom` across all accounts.
    #[must_use]
    pub fn total_frozen(&self, denom: &str) -> u64 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .fold(0u64, |sum, (_, entry)| sum.saturating_add(entry.frozen))
    }

    /// Non-zero balances in (account, denom) order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &str, &BalanceEntry)> {
        self.balances
            .iter()
            .filter(|(_, entry)| !entry.is_zero())
            .map(|((owner, denom), entry)| (owner, denom.as_str(), entry))
    }

    fn entry_mut(&mut self, owner: &AccountId, denom: &str) -> &mut BalanceEntry {
        self.balances
            .entry((owner.clone(), denom.to_string()))
            .or_default()
    }
}

impl EscrowLedger for BalanceLedger {
    fn freeze(&mut self, owner: &AccountId, denom: &str, amount: u64) -> Result<()> {
        let current = self.balance(owner, denom);
        if current.available < amount {
            return Err(DexmatchError::InsufficientBalance {
                owner: owner.clone(),
                denom: denom.to_string(),
                needed: amount,
                available: current.available,
            });
        }
        let frozen = current
            .frozen
            .checked_add(amount)
            .ok_or_else(|| DexmatchError::BalanceOverflow { denom: denom.to_string() })?;

        let entry = self.entry_mut(owner, denom);
        entry.available = current.available - amount;
        entry.frozen = frozen;
        tracing::trace!(%owner, denom, amount, "freeze");
        Ok(())
    }

    fn unfreeze(&mut self, owner: &AccountId, denom: &str, amount: u64) -> Result<()> {
        let current = self.balance(owner, denom);
        if current.frozen < amount {
            return Err(DexmatchError::InsufficientFrozen {
                owner: owner.clone(),
                denom: denom.to_string(),
                needed: amount,
                frozen: current.frozen,
            });
        }
        let available = current
            .available
            .checked_add(amount)
            .ok_or_else(|| DexmatchError::BalanceOverflow { denom: denom.to_string() })?;

        let entry = self.entry_mut(owner, denom);
        entry.frozen = current.frozen - amount;
        entry.available = available;
        tracing::trace!(%owner, denom, amount, "unfreeze");
        Ok(())
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, denom: &str, amount: u64) -> Result<()> {
        let source = self.balance(from, denom);
        if source.available < amount {
            return Err(DexmatchError::InsufficientBalance {
                owner: from.clone(),
                denom: denom.to_string(),
                needed: amount,
                available: source.available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to, denom)
            .available
            .checked_add(amount)
            .ok_or_else(|| DexmatchError::BalanceOverflow { denom: denom.to_string() })?;

        self.entry_mut(from, denom).available = source.available - amount;
        self.entry_mut(to, denom).available = credited;
        tracing::trace!(%from, %to, denom, amount, "transfer");
        Ok(())
    }
}
