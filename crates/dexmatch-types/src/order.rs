//! Order types for the DexMatch block matcher.
//!
//! An order is resting collateral plus an instruction. Collateral is
//! escrowed before the order reaches the store (stock for an ASK, money at
//! the limit price for a BID) and only leaves escrow through settlement or
//! release.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, DexmatchError, MarketPair, OrderId, Result, money_amount};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    /// Buys stock with money.
    Bid,
    /// Sells stock for money.
    Ask,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bid => write!(f, "BID"),
            Self::Ask => write!(f, "ASK"),
        }
    }
}

/// How long an order may rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Rests until filled, cancelled, or older than the configured lifetime.
    GoodTillExpire,
    /// Valid only in the block that created it.
    ImmediateOrCancel,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoodTillExpire => write!(f, "GTE"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
        }
    }
}

/// A resting order with its fill state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// `(owner, sequence)`; the owner is the escrow holder.
    pub id: OrderId,
    pub market: MarketPair,
    pub side: OrderSide,
    pub time_in_force: TimeInForce,
    /// Limit price, money per unit of stock.
    pub price: Decimal,
    /// Original stock quantity.
    pub quantity: u64,
    /// Stock quantity still open.
    pub left_stock: u64,
    /// Collateral still escrowed: stock for an ASK, money for a BID.
    pub freeze: u64,
    /// Cumulative stock traded.
    pub deal_stock: u64,
    /// Cumulative money traded.
    pub deal_money: u64,
    /// Block height the order was created at.
    pub height: u64,
}

impl Order {
    /// Build a fresh, unfilled order with its full collateral requirement.
    ///
    /// # Errors
    /// Returns [`DexmatchError::InvalidOrder`] for a non-positive price, a
    /// zero quantity, or a BID whose collateral rounds to zero.
    pub fn new(
        id: OrderId,
        market: MarketPair,
        side: OrderSide,
        time_in_force: TimeInForce,
        price: Decimal,
        quantity: u64,
        height: u64,
    ) -> Result<Self> {
        if price <= Decimal::ZERO {
            return Err(DexmatchError::InvalidOrder {
                reason: format!("price must be positive, got {price}"),
            });
        }
        if quantity == 0 {
            return Err(DexmatchError::InvalidOrder {
                reason: "quantity must be positive".into(),
            });
        }
        let freeze = required_collateral(side, price, quantity)?;
        if freeze == 0 {
            return Err(DexmatchError::InvalidOrder {
                reason: format!("collateral for {quantity} @ {price} rounds to zero"),
            });
        }
        Ok(Self {
            id,
            market,
            side,
            time_in_force,
            price,
            quantity,
            left_stock: quantity,
            freeze,
            deal_stock: 0,
            deal_money: 0,
            height,
        })
    }

    /// The escrow holder.
    #[must_use]
    pub fn owner(&self) -> &AccountId {
        &self.id.owner
    }

    /// Denomination held in escrow for this order.
    #[must_use]
    pub fn frozen_denom(&self) -> &str {
        match self.side {
            OrderSide::Bid => &self.market.money,
            OrderSide::Ask => &self.market.stock,
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.left_stock == 0
    }

    #[must_use]
    pub fn is_ioc(&self) -> bool {
        self.time_in_force == TimeInForce::ImmediateOrCancel
    }

    /// Collateral this order escrowed when it was created.
    pub fn initial_freeze(&self) -> Result<u64> {
        required_collateral(self.side, self.price, self.quantity)
    }

    /// Check the fill-state invariants.
    ///
    /// - `deal_stock + left_stock == quantity`
    /// - ASK: `freeze == left_stock`
    /// - BID: `freeze + deal_money == initial_freeze`
    ///
    /// # Errors
    /// Returns [`DexmatchError::InvariantViolation`] naming the broken rule.
    pub fn check_invariants(&self) -> Result<()> {
        if self.deal_stock.checked_add(self.left_stock) != Some(self.quantity) {
            return Err(DexmatchError::invariant(format!(
                "order {}: deal_stock {} + left_stock {} != quantity {}",
                self.id, self.deal_stock, self.left_stock, self.quantity
            )));
        }
        match self.side {
            OrderSide::Ask if self.freeze != self.left_stock => {
                Err(DexmatchError::invariant(format!(
                    "ask {}: freeze {} != left_stock {}",
                    self.id, self.freeze, self.left_stock
                )))
            }
            OrderSide::Bid => {
                let initial = self.initial_freeze()?;
                if self.freeze.checked_add(self.deal_money) == Some(initial) {
                    Ok(())
                } else {
                    Err(DexmatchError::invariant(format!(
                        "bid {}: freeze {} + deal_money {} != escrowed {initial}",
                        self.id, self.freeze, self.deal_money
                    )))
                }
            }
            OrderSide::Ask => Ok(()),
        }
    }
}

/// Collateral a new order must escrow.
///
/// ASK: `quantity` units of stock. BID: [`money_amount`]`(price, quantity)`.
pub fn required_collateral(side: OrderSide, price: Decimal, quantity: u64) -> Result<u64> {
    match side {
        OrderSide::Ask => Ok(quantity),
        OrderSide::Bid => money_amount(price, quantity),
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// A GTE order on `abc/cet` created at height 1.
    pub fn dummy(owner: &str, sequence: u64, side: OrderSide, price: Decimal, qty: u64) -> Self {
        Self::new(
            OrderId::new(AccountId::new(owner), sequence),
            MarketPair::new("abc", "cet"),
            side,
            TimeInForce::GoodTillExpire,
            price,
            qty,
            1,
        )
        .expect("dummy order parameters are valid")
    }

    #[must_use]
    pub fn at_height(mut self, height: u64) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn ioc(mut self) -> Self {
        self.time_in_force = TimeInForce::ImmediateOrCancel;
        self
    }

    #[must_use]
    pub fn in_market(mut self, market: MarketPair) -> Self {
        self.market = market;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_freezes_stock_quantity() {
        let ask = Order::dummy("seller", 1, OrderSide::Ask, Decimal::new(10, 0), 5);
        assert_eq!(ask.freeze, 5);
        assert_eq!(ask.frozen_denom(), "abc");
        ask.check_invariants().unwrap();
    }

    #[test]
    fn bid_freezes_money_at_limit_price() {
        let bid = Order::dummy("buyer", 1, OrderSide::Bid, Decimal::new(25, 1), 3);
        // 2.5 x 3 = 7.5 -> 8
        assert_eq!(bid.freeze, 8);
        assert_eq!(bid.frozen_denom(), "cet");
        bid.check_invariants().unwrap();
    }

    #[test]
    fn rejects_zero_quantity_and_bad_price() {
        let id = OrderId::new(AccountId::new("x"), 0);
        let pair = MarketPair::new("abc", "cet");
        let err = Order::new(
            id.clone(),
            pair.clone(),
            OrderSide::Bid,
            TimeInForce::GoodTillExpire,
            Decimal::ONE,
            0,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, DexmatchError::InvalidOrder { .. }));

        let err = Order::new(
            id,
            pair,
            OrderSide::Ask,
            TimeInForce::GoodTillExpire,
            Decimal::ZERO,
            1,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, DexmatchError::InvalidOrder { .. }));
    }

    #[test]
    fn rejects_bid_whose_collateral_rounds_to_zero() {
        let err = Order::new(
            OrderId::new(AccountId::new("x"), 0),
            MarketPair::new("abc", "cet"),
            OrderSide::Bid,
            TimeInForce::GoodTillExpire,
            Decimal::new(1, 1),
            1,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, DexmatchError::InvalidOrder { .. }));
    }

    #[test]
    fn invariant_catches_inconsistent_ask() {
        let mut ask = Order::dummy("seller", 1, OrderSide::Ask, Decimal::new(10, 0), 5);
        ask.freeze = 4;
        assert!(ask.check_invariants().is_err());
    }

    #[test]
    fn invariant_tracks_bid_payments() {
        let mut bid = Order::dummy("buyer", 1, OrderSide::Bid, Decimal::new(10, 0), 5);
        // Two units filled at 9: paid 18 out of the 50 escrowed.
        bid.left_stock = 3;
        bid.deal_stock = 2;
        bid.deal_money = 18;
        bid.freeze = 32;
        bid.check_invariants().unwrap();

        bid.freeze = 31;
        assert!(bid.check_invariants().is_err());
    }

    #[test]
    fn order_side_display() {
        assert_eq!(format!("{}", OrderSide::Bid), "BID");
        assert_eq!(format!("{}", OrderSide::Ask), "ASK");
        assert_eq!(format!("{}", TimeInForce::ImmediateOrCancel), "IOC");
    }

    #[test]
    fn serde_roundtrip_keeps_price_exact() {
        let order = Order::dummy("buyer", 9, OrderSide::Bid, Decimal::new(12345, 3), 4);
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"12.345\""), "price serializes as a string: {json}");
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
