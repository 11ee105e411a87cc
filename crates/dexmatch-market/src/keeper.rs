//! Persisted exchange state: markets, resting orders, last cleanup day.
//!
//! The keeper owns no collaborators. Operations that move collateral take
//! the escrow ledger as an explicit argument.

use std::collections::BTreeMap;

use dexmatch_settlement::release_collateral;
use dexmatch_types::constants::VERSION;
use dexmatch_types::{
    DexmatchError, EscrowLedger, MarketInfo, MarketPair, Order, OrderId, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OrderStore;

/// Serializable form of the whole keeper, used for genesis import and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub markets: Vec<MarketInfo>,
    pub orders: Vec<Order>,
    pub last_cleanup_day: Option<i32>,
}

impl StateSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketKeeper {
    markets: BTreeMap<String, MarketInfo>,
    orders: OrderStore,
    last_cleanup_day: Option<i32>,
}

impl MarketKeeper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Markets
    // =================================================================

    /// Register a trading pair with its initial reference price.
    ///
    /// # Errors
    /// - [`DexmatchError::DuplicateMarket`] if the symbol exists
    /// - [`DexmatchError::InvalidMarket`] for identical denoms or a
    ///   non-positive price
    pub fn create_market(&mut self, stock: &str, money: &str, initial_price: Decimal) -> Result<&MarketInfo> {
        let info = MarketInfo::new(MarketPair::new(stock, money), initial_price)?;
        let symbol = info.symbol();
        MarketPair::parse(&symbol)?;
        if self.markets.contains_key(&symbol) {
            return Err(DexmatchError::DuplicateMarket(symbol));
        }
        tracing::info!(market = %symbol, price = %initial_price, "market created");
        Ok(self.markets.entry(symbol).or_insert(info))
    }

    /// # Errors
    /// [`DexmatchError::UnknownMarket`] if no market has this symbol.
    pub fn market(&self, symbol: &str) -> Result<&MarketInfo> {
        self.markets
            .get(symbol)
            .ok_or_else(|| DexmatchError::UnknownMarket(symbol.to_string()))
    }

    /// Markets in symbol order.
    pub fn markets(&self) -> impl Iterator<Item = &MarketInfo> {
        self.markets.values()
    }

    pub(crate) fn set_reference_price(&mut self, symbol: &str, price: Decimal) -> Result<()> {
        if price <= Decimal::ZERO {
            return Err(DexmatchError::invariant(format!("reference price of {symbol} set to {price}")));
        }
        let info = self
            .markets
            .get_mut(symbol)
            .ok_or_else(|| DexmatchError::UnknownMarket(symbol.to_string()))?;
        info.last_executed_price = price;
        Ok(())
    }

    // =================================================================
    // Orders
    // =================================================================

    /// Escrow a new order's collateral and rest it in the book.
    ///
    /// # Errors
    /// - [`DexmatchError::UnknownMarket`] if its market is not registered
    /// - [`DexmatchError::DuplicateOrder`] if the id already rests
    /// - [`DexmatchError::InvalidOrder`] if the order carries fill state
    /// - any ledger error from freezing the collateral
    pub fn place_order<L: EscrowLedger + ?Sized>(&mut self, ledger: &mut L, order: Order) -> Result<()> {
        self.market(&order.market.symbol())?;
        if self.orders.contains(&order.id) {
            return Err(DexmatchError::DuplicateOrder(order.id));
        }
        if order.deal_stock != 0 || order.freeze != order.initial_freeze()? {
            return Err(DexmatchError::InvalidOrder {
                reason: format!("{} is not a fresh order", order.id),
            });
        }
        ledger.freeze(order.owner(), order.frozen_denom(), order.freeze)?;
        tracing::debug!(order = %order.id, side = %order.side, price = %order.price, qty = order.quantity, "order placed");
        self.orders.insert(order)
    }

    /// Cancel a resting order and return its remaining collateral.
    ///
    /// # Errors
    /// [`DexmatchError::OrderNotFound`] if the order is not resting;
    /// [`DexmatchError::LedgerRejected`] if the release fails.
    pub fn cancel_order<L: EscrowLedger + ?Sized>(&mut self, ledger: &mut L, id: &OrderId) -> Result<Order> {
        let order = self
            .orders
            .get(id)
            .ok_or_else(|| DexmatchError::OrderNotFound(id.clone()))?;
        release_collateral(ledger, order)?;
        let order = self.orders.remove(id)?;
        tracing::debug!(order = %order.id, "order cancelled");
        Ok(order)
    }

    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    pub(crate) fn orders_mut(&mut self) -> &mut OrderStore {
        &mut self.orders
    }

    // =================================================================
    // Cleanup day
    // =================================================================

    #[must_use]
    pub fn last_cleanup_day(&self) -> Option<i32> {
        self.last_cleanup_day
    }

    pub(crate) fn set_last_cleanup_day(&mut self, day: i32) {
        self.last_cleanup_day = Some(day);
    }

    // =================================================================
    // Snapshots
    // =================================================================

    /// Export the state: markets by symbol, orders by symbol then id.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            markets: self.markets.values().cloned().collect(),
            orders: self.orders.iter().cloned().collect(),
            last_cleanup_day: self.last_cleanup_day,
        }
    }

    /// Rebuild a keeper from a snapshot. Collateral is assumed to be
    /// escrowed already.
    ///
    /// # Errors
    /// Rejects invalid, unparseable or duplicate markets, orders for unknown markets,
    /// duplicate order ids, and orders whose fill state breaks the escrow
    /// invariants.
    pub fn from_snapshot(snapshot: StateSnapshot) -> Result<Self> {
        let mut keeper = Self {
            last_cleanup_day: snapshot.last_cleanup_day,
            ..Self::default()
        };
        for info in snapshot.markets {
            info.validate()?;
            let symbol = info.symbol();
            MarketPair::parse(&symbol)?;
            if keeper.markets.insert(symbol.clone(), info).is_some() {
                return Err(DexmatchError::DuplicateMarket(symbol));
            }
        }
        for order in snapshot.orders {
            keeper.market(&order.market.symbol())?;
            order.check_invariants()?;
            keeper.orders.insert(order)?;
        }
        tracing::info!(
            version = VERSION,
            markets = keeper.markets.len(),
            orders = keeper.orders.len(),
            "state imported"
        );
        Ok(keeper)
    }
}
