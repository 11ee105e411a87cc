//! Per-deal settlement.
//!
//! ```text
//! seller frozen stock  --unfreeze-->  seller available  --transfer-->  buyer
//! buyer  frozen money  --unfreeze-->  buyer  available  --transfer-->  seller
//! ```
//!
//! Both legs draw only on funds escrowed when the orders were placed, so a
//! well-formed deal can never be refused by a consistent ledger.

use dexmatch_types::{Deal, DexmatchError, EscrowLedger, Order, OrderSide, Result};

/// Settle one deal between `buyer` and `seller`.
///
/// # Errors
/// - [`DexmatchError::InvariantViolation`] if the orders do not match the
///   deal's ids, sides, or a common market
/// - [`DexmatchError::LedgerRejected`] if any unfreeze or transfer fails
pub fn settle_deal<L: EscrowLedger + ?Sized>(
    ledger: &mut L,
    buyer: &Order,
    seller: &Order,
    deal: &Deal,
) -> Result<()> {
    check_parties(buyer, seller, deal)?;

    let stock = buyer.market.stock.as_str();
    let money = buyer.market.money.as_str();

    if deal.quantity > 0 {
        ledger
            .unfreeze(seller.owner(), stock, deal.quantity)
            .map_err(|e| rejected("unfreeze stock", seller, &e))?;
        ledger
            .transfer(seller.owner(), buyer.owner(), stock, deal.quantity)
            .map_err(|e| rejected("transfer stock", seller, &e))?;
    }
    if deal.money > 0 {
        ledger
            .unfreeze(buyer.owner(), money, deal.money)
            .map_err(|e| rejected("unfreeze money", buyer, &e))?;
        ledger
            .transfer(buyer.owner(), seller.owner(), money, deal.money)
            .map_err(|e| rejected("transfer money", buyer, &e))?;
    }

    tracing::debug!(%deal, market = %buyer.market, "deal settled");
    Ok(())
}

fn check_parties(buyer: &Order, seller: &Order, deal: &Deal) -> Result<()> {
    if buyer.id != deal.buyer_order_id || seller.id != deal.seller_order_id {
        return Err(DexmatchError::invariant(format!(
            "{deal} settled with orders {} and {}",
            buyer.id, seller.id
        )));
    }
    if buyer.side != OrderSide::Bid || seller.side != OrderSide::Ask {
        return Err(DexmatchError::invariant(format!(
            "{deal}: buyer is {}, seller is {}",
            buyer.side, seller.side
        )));
    }
    if buyer.market != seller.market {
        return Err(DexmatchError::invariant(format!(
            "{deal}: buyer in {}, seller in {}",
            buyer.market, seller.market
        )));
    }
    Ok(())
}

pub(crate) fn rejected(operation: &'static str, order: &Order, err: &DexmatchError) -> DexmatchError {
    tracing::error!(%err, order = %order.id, operation, "escrow ledger rejected settlement");
    DexmatchError::LedgerRejected {
        operation,
        order_id: order.id.clone(),
        reason: err.to_string(),
    }
}
