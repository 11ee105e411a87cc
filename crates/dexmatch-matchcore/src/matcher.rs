//! Pure deterministic price-band matcher.
//!
//! ```text
//! match_orders(PriceBand, bids, asks) -> MatchOutcome { deals, last_price }
//! ```
//!
//! ## Priority
//!
//! Bids: price descending, then creation height ascending, then order id.
//! Asks: price ascending, then creation height ascending, then order id.
//! This total order is the tie-break contract every node reproduces.
//!
//! ## Execution price
//!
//! For a crossing pair the feasible prices are
//! `[max(low, ask.price), min(high, bid.price)]`. The deal executes at the
//! limit price of whichever order rested first (lower height, then lower id),
//! clamped into that interval. An empty interval ends the round: sorting
//! guarantees every later pair is at least as far outside the band.
//!
//! ## Fill accounting
//!
//! `quantity = min(bid.left_stock, ask.left_stock)` and
//! `money = min(round(price × quantity), bid.freeze)`. The buyer's escrow
//! shrinks by `money`, the seller's by `quantity`. The matcher never talks to
//! the ledger; settlement replays the deals afterwards.

use std::cmp::Ordering;

use dexmatch_types::{Deal, DexmatchError, Order, OrderSide, Result, money_amount};
use rust_decimal::Decimal;

use crate::PriceBand;

/// Deals produced by one round and the round's last execution price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub deals: Vec<Deal>,
    /// Price of the final deal, or zero when nothing traded.
    pub last_price: Decimal,
}

impl MatchOutcome {
    #[must_use]
    pub fn traded(&self) -> bool {
        !self.deals.is_empty()
    }
}

fn time_priority(a: &Order, b: &Order) -> Ordering {
    a.height.cmp(&b.height).then_with(|| a.id.cmp(&b.id))
}

/// Sort bids best-first: highest price, then oldest, then lowest id.
pub fn sort_bids(bids: &mut [Order]) {
    bids.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| time_priority(a, b)));
}

/// Sort asks best-first: lowest price, then oldest, then lowest id.
pub fn sort_asks(asks: &mut [Order]) {
    asks.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| time_priority(a, b)));
}

/// Match one market's bids against its asks inside `band`.
///
/// Both slices are sorted in place and their fill fields (`left_stock`,
/// `freeze`, `deal_stock`, `deal_money`) are updated for every order that
/// trades. Orders are never removed and no collateral moves.
///
/// # Errors
/// - [`DexmatchError::InvariantViolation`] if a bid is not a BID, an ask is
///   not an ASK, the two sides belong to different markets, or a fill would
///   drive a quantity negative
/// - [`DexmatchError::ArithmeticOverflow`] if money cannot be computed
pub fn match_orders(band: &PriceBand, bids: &mut [Order], asks: &mut [Order]) -> Result<MatchOutcome> {
    check_sides(bids, asks)?;
    sort_bids(bids);
    sort_asks(asks);

    let mut deals = Vec::new();
    let (mut bi, mut ai) = (0, 0);

    while bi < bids.len() && ai < asks.len() {
        let (bid, ask) = (&bids[bi], &asks[ai]);
        if bid.left_stock == 0 || bid.freeze == 0 {
            bi += 1;
            continue;
        }
        if ask.left_stock == 0 {
            ai += 1;
            continue;
        }
        if bid.price < ask.price {
            break;
        }

        let Some((floor, ceiling)) = band.execution_interval(bid.price, ask.price) else {
            tracing::trace!(
                bid = %bid.id,
                ask = %ask.id,
                low = %band.low,
                high = %band.high,
                "crossing pair outside price band, round ends"
            );
            break;
        };

        let reference = if time_priority(bid, ask) == Ordering::Less {
            bid.price
        } else {
            ask.price
        };
        let price = reference.clamp(floor, ceiling);
        let quantity = bid.left_stock.min(ask.left_stock);
        let money = money_amount(price, quantity)?.min(bid.freeze);

        let deal = Deal {
            buyer_order_id: bid.id.clone(),
            seller_order_id: ask.id.clone(),
            quantity,
            price,
            money,
        };

        apply_fill(&mut bids[bi], quantity, money)?;
        apply_fill(&mut asks[ai], quantity, money)?;
        tracing::trace!(%deal, "deal");
        deals.push(deal);
    }

    let last_price = deals.last().map_or(Decimal::ZERO, |d| d.price);
    Ok(MatchOutcome { deals, last_price })
}

fn check_sides(bids: &[Order], asks: &[Order]) -> Result<()> {
    if let Some(o) = bids.iter().find(|o| o.side != OrderSide::Bid) {
        return Err(DexmatchError::invariant(format!("{} passed as bid but is {}", o.id, o.side)));
    }
    if let Some(o) = asks.iter().find(|o| o.side != OrderSide::Ask) {
        return Err(DexmatchError::invariant(format!("{} passed as ask but is {}", o.id, o.side)));
    }
    let mut markets = bids.iter().chain(asks.iter()).map(|o| &o.market);
    if let Some(first) = markets.next() {
        if let Some(other) = markets.find(|m| *m != first) {
            return Err(DexmatchError::invariant(format!(
                "orders from {first} and {other} in one round"
            )));
        }
    }
    Ok(())
}

/// Record a fill of `quantity` stock for `money` on one side of a deal.
fn apply_fill(order: &mut Order, quantity: u64, money: u64) -> Result<()> {
    let underflow = |field: &str| {
        DexmatchError::invariant(format!("fill of {quantity}/{money} drives {field} of {} negative", order.id))
    };
    let overflow = |field: &str| DexmatchError::ArithmeticOverflow(format!("{field} of {}", order.id));

    let escrow_spent = match order.side {
        OrderSide::Bid => money,
        OrderSide::Ask => quantity,
    };
    let left_stock = order.left_stock.checked_sub(quantity).ok_or_else(|| underflow("left_stock"))?;
    let freeze = order.freeze.checked_sub(escrow_spent).ok_or_else(|| underflow("freeze"))?;
    let deal_stock = order.deal_stock.checked_add(quantity).ok_or_else(|| overflow("deal_stock"))?;
    let deal_money = order.deal_money.checked_add(money).ok_or_else(|| overflow("deal_money"))?;

    order.left_stock = left_stock;
    order.freeze = freeze;
    order.deal_stock = deal_stock;
    order.deal_money = deal_money;
    Ok(())
}
