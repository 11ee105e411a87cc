//! Returning leftover collateral when an order leaves the book.

use dexmatch_types::{EscrowLedger, Order, Result};

use crate::executor::rejected;

/// Unfreeze whatever `order` still has in escrow. Returns the amount released.
///
/// # Errors
/// [`dexmatch_types::DexmatchError::LedgerRejected`] if the ledger holds
/// less frozen balance than the order claims.
pub fn release_collateral<L: EscrowLedger + ?Sized>(ledger: &mut L, order: &Order) -> Result<u64> {
    if order.freeze == 0 {
        return Ok(0);
    }
    ledger
        .unfreeze(order.owner(), order.frozen_denom(), order.freeze)
        .map_err(|e| rejected("release", order, &e))?;
    tracing::debug!(order = %order.id, denom = order.frozen_denom(), amount = order.freeze, "collateral released");
    Ok(order.freeze)
}
