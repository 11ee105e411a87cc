//! Read-only queries for reporting layers.
//!
//! Nothing here mutates the keeper. Unknown markets and orders are input
//! rejections.

use std::collections::BTreeMap;

use dexmatch_types::{AccountId, DexmatchError, MarketPair, Order, OrderId, OrderSide, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::MarketKeeper;

/// Aggregate open quantity at one price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Decimal,
    pub quantity: u64,
    pub orders: usize,
}

/// Reference price and aggregated book of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDepth {
    pub symbol: String,
    pub reference_price: Decimal,
    /// Highest price first.
    pub bids: Vec<DepthLevel>,
    /// Lowest price first.
    pub asks: Vec<DepthLevel>,
    pub total_bid_stock: u64,
    pub total_ask_stock: u64,
}

impl MarketDepth {
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }
}

/// # Errors
/// [`DexmatchError::MalformedSymbol`] or [`DexmatchError::UnknownMarket`];
/// [`DexmatchError::ArithmeticOverflow`] if a level or side total exceeds `u64`.
pub fn market_depth(keeper: &MarketKeeper, symbol: &str) -> Result<MarketDepth> {
    let pair = MarketPair::parse(symbol)?;
    let info = keeper.market(&pair.symbol())?;

    let mut bids: BTreeMap<Decimal, DepthLevel> = BTreeMap::new();
    let mut asks: BTreeMap<Decimal, DepthLevel> = BTreeMap::new();
    for order in keeper.orders().market_orders(&info.symbol()) {
        let side = match order.side {
            OrderSide::Bid => &mut bids,
            OrderSide::Ask => &mut asks,
        };
        let level = side.entry(order.price).or_insert(DepthLevel {
            price: order.price,
            quantity: 0,
            orders: 0,
        });
        level.quantity = level
            .quantity
            .checked_add(order.left_stock)
            .ok_or_else(|| DexmatchError::ArithmeticOverflow(format!("depth of {} at {}", order.market, order.price)))?;
        level.orders += 1;
    }

    let bids: Vec<DepthLevel> = bids.into_values().rev().collect();
    let asks: Vec<DepthLevel> = asks.into_values().collect();
    Ok(MarketDepth {
        symbol: info.symbol(),
        reference_price: info.last_executed_price,
        total_bid_stock: side_total(&bids)?,
        total_ask_stock: side_total(&asks)?,
        bids,
        asks,
    })
}

fn side_total(levels: &[DepthLevel]) -> Result<u64> {
    levels.iter().try_fold(0u64, |total, level| {
        total
            .checked_add(level.quantity)
            .ok_or_else(|| DexmatchError::ArithmeticOverflow("total book depth".to_string()))
    })
}

/// # Errors
/// [`DexmatchError::OrderNotFound`] if the order is not resting.
pub fn order<'a>(keeper: &'a MarketKeeper, id: &OrderId) -> Result<&'a Order> {
    keeper
        .orders()
        .get(id)
        .ok_or_else(|| DexmatchError::OrderNotFound(id.clone()))
}

/// Resting orders of one account, in id order.
#[must_use]
pub fn orders_of<'a>(keeper: &'a MarketKeeper, owner: &AccountId) -> Vec<&'a Order> {
    keeper.orders().orders_of(owner)
}
