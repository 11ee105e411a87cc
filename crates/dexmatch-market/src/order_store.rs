//! Resting orders for every market.
//!
//! Layout mirrors the persisted state: `symbol -> (order id -> order)`, both
//! levels `BTreeMap`. An auxiliary `OrderId -> symbol` index serves lookups
//! and removals that arrive with only an id.
//!
//! Every query returns orders in increasing order-id order.

use std::collections::BTreeMap;

use dexmatch_types::{AccountId, DexmatchError, Order, OrderId, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStore {
    books: BTreeMap<String, BTreeMap<OrderId, Order>>,
    index: BTreeMap<OrderId, String>,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// # Errors
    /// [`DexmatchError::DuplicateOrder`] if the id is already resting.
    pub fn insert(&mut self, order: Order) -> Result<()> {
        if self.index.contains_key(&order.id) {
            return Err(DexmatchError::DuplicateOrder(order.id));
        }
        let symbol = order.market.symbol();
        self.index.insert(order.id.clone(), symbol.clone());
        self.books.entry(symbol).or_default().insert(order.id.clone(), order);
        Ok(())
    }

    /// Remove and return an order.
    ///
    /// # Errors
    /// [`DexmatchError::OrderNotFound`] if no such order rests.
    pub fn remove(&mut self, id: &OrderId) -> Result<Order> {
        let symbol = self
            .index
            .remove(id)
            .ok_or_else(|| DexmatchError::OrderNotFound(id.clone()))?;
        let book = self
            .books
            .get_mut(&symbol)
            .ok_or_else(|| DexmatchError::Internal(format!("index points {id} at missing book {symbol}")))?;
        let order = book
            .remove(id)
            .ok_or_else(|| DexmatchError::Internal(format!("index points {id} at {symbol} but book lacks it")))?;
        if book.is_empty() {
            self.books.remove(&symbol);
        }
        Ok(order)
    }

    /// Overwrite the fill state of a resting order.
    ///
    /// # Errors
    /// [`DexmatchError::OrderNotFound`] if the order is not resting, or
    /// [`DexmatchError::InvariantViolation`] if the update would move it to
    /// another market.
    pub fn update(&mut self, order: Order) -> Result<()> {
        let slot = self
            .books
            .get_mut(&order.market.symbol())
            .and_then(|book| book.get_mut(&order.id))
            .ok_or_else(|| DexmatchError::OrderNotFound(order.id.clone()))?;
        if slot.market != order.market || slot.side != order.side {
            return Err(DexmatchError::invariant(format!("update changes identity of {}", order.id)));
        }
        *slot = order;
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        let symbol = self.index.get(id)?;
        self.books.get(symbol)?.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &OrderId) -> bool {
        self.index.contains_key(id)
    }

    /// Orders created strictly before `height`, across all markets.
    #[must_use]
    pub fn older_than(&self, height: u64) -> Vec<Order> {
        self.collect_sorted(|o| o.height < height)
    }

    /// Every resting order of one market.
    ///
    /// Immediate-or-cancel orders are included regardless of height; the
    /// driver decides whether they may still trade.
    #[must_use]
    pub fn matching_candidates(&self, symbol: &str) -> Vec<Order> {
        self.market_orders(symbol).cloned().collect()
    }

    /// Orders of one market created at exactly `height`.
    #[must_use]
    pub fn created_at(&self, symbol: &str, height: u64) -> Vec<Order> {
        self.market_orders(symbol).filter(|o| o.height == height).cloned().collect()
    }

    /// Immediate-or-cancel orders across all markets.
    #[must_use]
    pub fn immediate_or_cancel(&self) -> Vec<Order> {
        self.collect_sorted(Order::is_ioc)
    }

    /// Resting orders owned by `owner`, across all markets.
    #[must_use]
    pub fn orders_of(&self, owner: &AccountId) -> Vec<&Order> {
        // Ids sort by owner first, so one owner's orders are contiguous.
        self.index
            .keys()
            .skip_while(|id| id.owner < *owner)
            .take_while(|id| id.owner == *owner)
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// One market's orders in id order.
    pub fn market_orders(&self, symbol: &str) -> impl Iterator<Item = &Order> {
        self.books.get(symbol).into_iter().flat_map(BTreeMap::values)
    }

    /// All orders, grouped by symbol and then id.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.books.values().flat_map(BTreeMap::values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn collect_sorted(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        self.index
            .keys()
            .filter_map(|id| self.get(id))
            .filter(|o| keep(o))
            .cloned()
            .collect()
    }
}
