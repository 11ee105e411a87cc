//! The per-block market driver.
//!
//! ```text
//! end_block(keeper, ledger, policy, params, ctx) -> BlockReport
//! ```
//!
//! The first block of each calendar day runs **EXPIRY**: every order older
//! than the good-till-expire lifetime is removed and its collateral released.
//! Every other block runs **MATCHING**, in three stages:
//!
//! 1. **Compute**: for each tradable market (symbol order), filter the
//!    candidates and match them inside the market's price band
//! 2. **Settle**: replay every deal against the escrow ledger, market by
//!    market, deal by deal
//! 3. **Commit**: remove filled, exhausted and immediate-or-cancel orders
//!    (releasing leftovers), persist the rest, move reference prices
//!
//! Both modes finish by sweeping immediate-or-cancel orders, which never
//! outlive their block.
//!
//! The block runs against a working copy of the keeper that replaces the
//! caller's only on success, so an `Err` leaves the keeper exactly as it
//! was. Ledger writes go through the host's [`EscrowLedger`]; on `Err` the
//! host must discard them, exactly as it would for a panicking transaction.

use std::collections::{BTreeMap, BTreeSet};

use dexmatch_matchcore::{PriceBand, combine_roots, compute_deal_root, filter_candidates, match_orders, root_hex};
use dexmatch_settlement::{release_collateral, settle_deal};
use dexmatch_types::{
    BlockContext, BlockMode, Deal, DexmatchError, EscrowLedger, MarketInfo, MarketParams, Order,
    OrderId, OrderSide, Result, TokenPolicy,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::MarketKeeper;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Why an order left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Remaining quantity reached zero.
    Filled,
    /// Remaining collateral reached zero before the quantity did.
    CollateralExhausted,
    /// Immediate-or-cancel order at the end of its block.
    ImmediateOrCancel,
    /// Older than the good-till-expire lifetime.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedOrder {
    pub id: OrderId,
    pub reason: RemovalReason,
    /// Collateral returned to the owner.
    pub released: u64,
}

/// One market's matching round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRound {
    pub symbol: String,
    pub deals: Vec<Deal>,
    /// New reference price, if the round traded.
    pub new_price: Option<Decimal>,
    pub deal_root: [u8; 32],
}

/// Everything one block did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReport {
    pub height: u64,
    pub mode: BlockMode,
    /// Rounds in symbol order; empty in expiry mode.
    pub rounds: Vec<MarketRound>,
    /// Markets skipped because a denomination is frozen.
    pub frozen_markets: Vec<String>,
    /// Removals in the order they were applied.
    pub removed: Vec<RemovedOrder>,
    /// Root over every round's deal root; the cross-node comparison key.
    pub deal_root: [u8; 32],
}

impl BlockReport {
    pub fn deals(&self) -> impl Iterator<Item = &Deal> {
        self.rounds.iter().flat_map(|r| r.deals.iter())
    }

    #[must_use]
    pub fn deal_count(&self) -> usize {
        self.rounds.iter().map(|r| r.deals.len()).sum()
    }

    #[must_use]
    pub fn removal_of(&self, id: &OrderId) -> Option<&RemovedOrder> {
        self.removed.iter().find(|r| &r.id == id)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run one block.
///
/// # Errors
/// - [`DexmatchError::Configuration`] for invalid `params`
/// - any fatal matching, settlement or release error (see module docs)
pub fn end_block<L, P>(
    keeper: &mut MarketKeeper,
    ledger: &mut L,
    policy: &P,
    params: &MarketParams,
    ctx: &BlockContext,
) -> Result<BlockReport>
where
    L: EscrowLedger + ?Sized,
    P: TokenPolicy + ?Sized,
{
    params.validate()?;

    let mut working = keeper.clone();
    let report = run_block(&mut working, ledger, policy, params, ctx).inspect_err(|err| {
        tracing::error!(height = ctx.height, error = %err, "block aborted, keeper left unchanged");
    })?;
    *keeper = working;
    Ok(report)
}

fn run_block<L, P>(
    keeper: &mut MarketKeeper,
    ledger: &mut L,
    policy: &P,
    params: &MarketParams,
    ctx: &BlockContext,
) -> Result<BlockReport>
where
    L: EscrowLedger + ?Sized,
    P: TokenPolicy + ?Sized,
{

    let day = ctx.calendar_day();
    let mode = if keeper.last_cleanup_day() == Some(day) {
        BlockMode::Matching
    } else {
        BlockMode::Expiry
    };
    tracing::info!(height = ctx.height, %mode, day, "end block");

    let mut report = BlockReport {
        height: ctx.height,
        mode,
        rounds: Vec::new(),
        frozen_markets: Vec::new(),
        removed: Vec::new(),
        deal_root: [0u8; 32],
    };

    match mode {
        BlockMode::Expiry => {
            expire_orders(keeper, ledger, params, ctx, &mut report)?;
            keeper.set_last_cleanup_day(day);
        }
        BlockMode::Matching => run_matching(keeper, ledger, policy, params, ctx, &mut report)?,
    }

    sweep_immediate_or_cancel(keeper, ledger, &mut report)?;

    let roots: Vec<(String, [u8; 32])> = report
        .rounds
        .iter()
        .map(|r| (r.symbol.clone(), r.deal_root))
        .collect();
    report.deal_root = combine_roots(&roots);

    tracing::info!(
        height = ctx.height,
        %mode,
        deals = report.deal_count(),
        removed = report.removed.len(),
        resting = keeper.orders().len(),
        deal_root = %root_hex(&report.deal_root),
        "block processed"
    );
    Ok(report)
}

fn expire_orders<L: EscrowLedger + ?Sized>(
    keeper: &mut MarketKeeper,
    ledger: &mut L,
    params: &MarketParams,
    ctx: &BlockContext,
    report: &mut BlockReport,
) -> Result<()> {
    let threshold = ctx.height.saturating_sub(params.gte_order_lifetime);
    for order in keeper.orders().older_than(threshold) {
        remove_order(keeper, ledger, &order, RemovalReason::Expired, report)?;
    }
    Ok(())
}

/// A computed but not yet applied round.
struct StagedRound {
    info: MarketInfo,
    deals: Vec<Deal>,
    last_price: Decimal,
    /// Post-match state of every order that took part.
    orders: BTreeMap<OrderId, Order>,
}

fn run_matching<L, P>(
    keeper: &mut MarketKeeper,
    ledger: &mut L,
    policy: &P,
    params: &MarketParams,
    ctx: &BlockContext,
    report: &mut BlockReport,
) -> Result<()>
where
    L: EscrowLedger + ?Sized,
    P: TokenPolicy + ?Sized,
{
    // Compute.
    let mut staged = Vec::new();
    for info in keeper.markets() {
        let pair = &info.pair;
        if policy.is_token_frozen(&pair.stock) || policy.is_token_frozen(&pair.money) {
            tracing::warn!(market = %pair, "token frozen, market skipped");
            report.frozen_markets.push(info.symbol());
            continue;
        }

        let candidates: Vec<Order> = keeper
            .orders()
            .matching_candidates(&info.symbol())
            .into_iter()
            .filter(|o| !o.is_ioc() || o.height == ctx.height)
            .collect();
        let (mut bids, mut asks): (Vec<Order>, Vec<Order>) = filter_candidates(policy, candidates, pair)
            .into_iter()
            .partition(|o| o.side == OrderSide::Bid);

        let band = PriceBand::around(info.last_executed_price, params.max_executed_price_change_ratio)?;
        let outcome = match_orders(&band, &mut bids, &mut asks)?;
        tracing::debug!(
            market = %pair,
            bids = bids.len(),
            asks = asks.len(),
            deals = outcome.deals.len(),
            low = %band.low,
            high = %band.high,
            "market matched"
        );

        staged.push(StagedRound {
            info: info.clone(),
            deals: outcome.deals,
            last_price: outcome.last_price,
            orders: bids.into_iter().chain(asks).map(|o| (o.id.clone(), o)).collect(),
        });
    }

    // Settle.
    for round in &staged {
        for deal in &round.deals {
            let buyer = staged_order(round, &deal.buyer_order_id)?;
            let seller = staged_order(round, &deal.seller_order_id)?;
            settle_deal(ledger, buyer, seller, deal)?;
        }
    }

    // Commit.
    for round in staged {
        let symbol = round.info.symbol();
        let touched: BTreeSet<&OrderId> = round
            .deals
            .iter()
            .flat_map(|d| [&d.buyer_order_id, &d.seller_order_id])
            .collect();

        for id in touched {
            let order = staged_order(&round, id)?;
            order.check_invariants()?;
            if order.is_filled() {
                remove_order(keeper, ledger, order, RemovalReason::Filled, report)?;
            } else if order.is_ioc() {
                remove_order(keeper, ledger, order, RemovalReason::ImmediateOrCancel, report)?;
            } else if order.freeze == 0 {
                remove_order(keeper, ledger, order, RemovalReason::CollateralExhausted, report)?;
            } else {
                keeper.orders_mut().update(order.clone())?;
            }
        }

        let new_price = (round.last_price != Decimal::ZERO).then_some(round.last_price);
        if let Some(price) = new_price {
            keeper.set_reference_price(&symbol, price)?;
            tracing::debug!(market = %symbol, price = %price, "reference price updated");
        }

        report.rounds.push(MarketRound {
            deal_root: compute_deal_root(&symbol, &round.deals),
            symbol,
            deals: round.deals,
            new_price,
        });
    }
    Ok(())
}

fn staged_order<'a>(round: &'a StagedRound, id: &OrderId) -> Result<&'a Order> {
    round
        .orders
        .get(id)
        .ok_or_else(|| DexmatchError::invariant(format!("deal references {id} outside its round")))
}

fn sweep_immediate_or_cancel<L: EscrowLedger + ?Sized>(
    keeper: &mut MarketKeeper,
    ledger: &mut L,
    report: &mut BlockReport,
) -> Result<()> {
    for order in keeper.orders().immediate_or_cancel() {
        remove_order(keeper, ledger, &order, RemovalReason::ImmediateOrCancel, report)?;
    }
    Ok(())
}

/// Release leftover collateral, then delete the order from the store.
fn remove_order<L: EscrowLedger + ?Sized>(
    keeper: &mut MarketKeeper,
    ledger: &mut L,
    order: &Order,
    reason: RemovalReason,
    report: &mut BlockReport,
) -> Result<()> {
    let released = release_collateral(ledger, order)?;
    keeper.orders_mut().remove(&order.id)?;
    tracing::debug!(order = %order.id, ?reason, released, "order removed");
    report.removed.push(RemovedOrder {
        id: order.id.clone(),
        reason,
        released,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use dexmatch_ledger::{AssetStatus, BalanceLedger};
    use dexmatch_types::*;

    use super::*;

    const DAY1: (i32, u32, u32) = (2024, 3, 5);

    fn ctx(height: u64, (y, m, d): (i32, u32, u32)) -> BlockContext {
        BlockContext::new(height, Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    struct World {
        keeper: MarketKeeper,
        ledger: BalanceLedger,
        policy: AssetStatus,
        params: MarketParams,
    }

    impl World {
        /// One market `abc/cet` at 10 with ±10%, and the cleanup for DAY1
        /// already done.
        fn new() -> Self {
            let mut keeper = MarketKeeper::new();
            keeper.create_market("abc", "cet", Decimal::TEN).unwrap();
            keeper.set_last_cleanup_day(ctx(0, DAY1).calendar_day());
            Self {
                keeper,
                ledger: BalanceLedger::new(),
                policy: AssetStatus::new(),
                params: MarketParams {
                    gte_order_lifetime: 50,
                    max_executed_price_change_ratio: 10,
                },
            }
        }

        fn place(&mut self, order: Order) -> Order {
            let owner = order.owner().clone();
            self.ledger.deposit(&owner, "abc", 1_000).unwrap();
            self.ledger.deposit(&owner, "cet", 1_000).unwrap();
            self.keeper.place_order(&mut self.ledger, order.clone()).unwrap();
            order
        }

        fn run(&mut self, ctx: &BlockContext) -> BlockReport {
            end_block(&mut self.keeper, &mut self.ledger, &self.policy, &self.params, ctx).unwrap()
        }
    }

    #[test]
    fn first_block_ever_runs_expiry() {
        let mut keeper = MarketKeeper::new();
        let report = end_block(
            &mut keeper,
            &mut BalanceLedger::new(),
            &AssetStatus::new(),
            &MarketParams::default(),
            &ctx(1, DAY1),
        )
        .unwrap();
        assert_eq!(report.mode, BlockMode::Expiry);
        assert_eq!(keeper.last_cleanup_day(), Some(ctx(1, DAY1).calendar_day()));
    }

    #[test]
    fn new_day_switches_to_expiry_once() {
        let mut w = World::new();
        assert_eq!(w.run(&ctx(10, DAY1)).mode, BlockMode::Matching);
        assert_eq!(w.run(&ctx(11, (2024, 3, 6))).mode, BlockMode::Expiry);
        assert_eq!(w.run(&ctx(12, (2024, 3, 6))).mode, BlockMode::Matching);
    }

    #[test]
    fn expiry_mode_does_not_match() {
        let mut w = World::new();
        w.place(Order::dummy("alice", 1, OrderSide::Bid, Decimal::TEN, 5).at_height(20));
        w.place(Order::dummy("bob", 1, OrderSide::Ask, Decimal::TEN, 5).at_height(20));
        let report = w.run(&ctx(21, (2024, 3, 6)));
        assert_eq!(report.deal_count(), 0);
        assert_eq!(w.keeper.orders().len(), 2);
    }

    #[test]
    fn touched_partial_gte_order_is_persisted() {
        let mut w = World::new();
        let bid = w.place(Order::dummy("alice", 1, OrderSide::Bid, Decimal::TEN, 8).at_height(9));
        let ask = w.place(Order::dummy("bob", 1, OrderSide::Ask, Decimal::TEN, 3).at_height(9));

        let report = w.run(&ctx(10, DAY1));
        assert_eq!(report.deal_count(), 1);
        assert_eq!(report.removal_of(&ask.id).unwrap().reason, RemovalReason::Filled);
        assert!(report.removal_of(&bid.id).is_none());

        let rest = w.keeper.orders().get(&bid.id).unwrap();
        assert_eq!(rest.left_stock, 5);
        assert_eq!(rest.freeze, 50);
        assert_eq!(w.ledger.balance(bid.owner(), "cet").frozen, 50);
    }

    #[test]
    fn reference_price_moves_only_on_trade() {
        let mut w = World::new();
        w.place(Order::dummy("alice", 1, OrderSide::Bid, Decimal::new(105, 1), 2).at_height(1));
        w.place(Order::dummy("bob", 1, OrderSide::Ask, Decimal::TEN, 2).at_height(2));

        let report = w.run(&ctx(10, DAY1));
        assert_eq!(report.rounds[0].new_price, Some(Decimal::new(105, 1)));
        assert_eq!(w.keeper.market("abc/cet").unwrap().last_executed_price, Decimal::new(105, 1));

        let report = w.run(&ctx(11, DAY1));
        assert_eq!(report.rounds[0].new_price, None);
        assert_eq!(w.keeper.market("abc/cet").unwrap().last_executed_price, Decimal::new(105, 1));
    }

    #[test]
    fn bid_with_exhausted_collateral_is_removed() {
        // 0.5 x 3 escrows 2; two single fills at 0.5 consume it all.
        let mut w = World::new();
        w.keeper.create_market("xyz", "cet", Decimal::new(5, 1)).unwrap();
        let xyz = MarketPair::new("xyz", "cet");
        let bid = w.place(Order::dummy("alice", 1, OrderSide::Bid, Decimal::new(5, 1), 3).in_market(xyz.clone()).at_height(1));
        w.ledger.deposit(&AccountId::new("bob"), "xyz", 10).unwrap();
        for seq in 1..=2 {
            w.place(Order::dummy("bob", seq, OrderSide::Ask, Decimal::new(5, 1), 1).in_market(xyz.clone()).at_height(2));
        }

        let report = w.run(&ctx(10, DAY1));
        let removal = report.removal_of(&bid.id).unwrap();
        assert_eq!(removal.reason, RemovalReason::CollateralExhausted);
        assert_eq!(removal.released, 0);
        assert!(w.keeper.orders().get(&bid.id).is_none());
        assert_eq!(w.ledger.balance(bid.owner(), "xyz").available, 2);
    }

    #[test]
    fn stale_ioc_never_trades_and_is_swept() {
        let mut w = World::new();
        let stale = Order::dummy("alice", 1, OrderSide::Bid, Decimal::TEN, 5).at_height(3).ioc();
        w.place(stale.clone());
        w.place(Order::dummy("bob", 1, OrderSide::Ask, Decimal::TEN, 5).at_height(3));

        let report = w.run(&ctx(10, DAY1));
        assert_eq!(report.deal_count(), 0);
        let removal = report.removal_of(&stale.id).unwrap();
        assert_eq!(removal.reason, RemovalReason::ImmediateOrCancel);
        assert_eq!(removal.released, 50);
    }

    #[test]
    fn invalid_params_rejected_before_anything_runs() {
        let mut w = World::new();
        w.params.max_executed_price_change_ratio = 101;
        let err = end_block(&mut w.keeper, &mut w.ledger, &w.policy, &w.params, &ctx(10, DAY1)).unwrap_err();
        assert!(matches!(err, DexmatchError::Configuration(_)));
        assert_eq!(w.keeper.last_cleanup_day(), Some(ctx(0, DAY1).calendar_day()));
    }

    #[test]
    fn ledger_drift_is_fatal() {
        let mut w = World::new();
        let bid = w.place(Order::dummy("alice", 1, OrderSide::Bid, Decimal::TEN, 5).at_height(1));
        w.place(Order::dummy("bob", 1, OrderSide::Ask, Decimal::TEN, 5).at_height(1));
        // Escrow vanishes behind the driver's back.
        w.ledger.unfreeze(bid.owner(), "cet", 50).unwrap();

        let err = end_block(&mut w.keeper, &mut w.ledger, &w.policy, &w.params, &ctx(10, DAY1)).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, DexmatchError::LedgerRejected { .. }));
    }

    #[test]
    fn failed_block_leaves_keeper_untouched() {
        let mut w = World::new();
        w.place(Order::dummy("alice", 1, OrderSide::Ask, Decimal::TEN, 5).at_height(1));
        let broken = w.place(Order::dummy("zed", 1, OrderSide::Ask, Decimal::TEN, 5).at_height(1));
        w.ledger.unfreeze(broken.owner(), "abc", 5).unwrap();
        let before = w.keeper.clone();

        // alice expires and is removed in the working copy before zed's release fails.
        let err = end_block(&mut w.keeper, &mut w.ledger, &w.policy, &w.params, &ctx(100, (2024, 3, 6))).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(w.keeper, before);
        assert_eq!(w.keeper.orders().len(), 2);
        assert_eq!(w.keeper.last_cleanup_day(), Some(ctx(0, DAY1).calendar_day()));
    }

    #[test]
    fn report_serializes() {
        let mut w = World::new();
        w.place(Order::dummy("alice", 1, OrderSide::Bid, Decimal::TEN, 5).at_height(1));
        w.place(Order::dummy("bob", 1, OrderSide::Ask, Decimal::TEN, 5).at_height(1));
        let report = w.run(&ctx(10, DAY1));
        let json = serde_json::to_string(&report).unwrap();
        let back: BlockReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert_eq!(back.deals().count(), 1);
    }
}
