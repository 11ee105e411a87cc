//! Property tests for the matcher.
//!
//! Random books are matched under random bands; every run must keep the
//! escrow invariants, stay inside the band, and produce the same deals
//! regardless of the order the candidates arrive in.

use dexmatch_matchcore::{PriceBand, compute_deal_root, match_orders};
use dexmatch_types::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

type Quote = (i64, u64, u64);

fn build(side: OrderSide, owner: &str, quotes: &[Quote]) -> Vec<Order> {
    quotes
        .iter()
        .enumerate()
        .map(|(i, &(tenths, qty, height))| {
            Order::dummy(owner, i as u64, side, Decimal::new(tenths, 1), qty).at_height(height)
        })
        .collect()
}

fn book() -> impl Strategy<Value = Vec<Quote>> {
    prop::collection::vec((5i64..=200, 1u64..=100, 1u64..=20), 0..12)
}

proptest! {
    #[test]
    fn fills_keep_escrow_consistent(
        bids in book(),
        asks in book(),
        mid in 50i64..=150,
        ratio in 0u32..=50,
    ) {
        let band = PriceBand::around(Decimal::new(mid, 1), ratio).unwrap();
        let mut bids = build(OrderSide::Bid, "buyer", &bids);
        let mut asks = build(OrderSide::Ask, "seller", &asks);

        let outcome = match_orders(&band, &mut bids, &mut asks).unwrap();

        for order in bids.iter().chain(asks.iter()) {
            prop_assert!(order.check_invariants().is_ok(), "{:?}", order.check_invariants());
        }

        let bought: u64 = bids.iter().map(|o| o.deal_stock).sum();
        let sold: u64 = asks.iter().map(|o| o.deal_stock).sum();
        let traded: u64 = outcome.deals.iter().map(|d| d.quantity).sum();
        prop_assert_eq!(bought, traded);
        prop_assert_eq!(sold, traded);

        let paid: u64 = bids.iter().map(|o| o.deal_money).sum();
        let received: u64 = asks.iter().map(|o| o.deal_money).sum();
        prop_assert_eq!(paid, received);
    }

    #[test]
    fn deals_execute_inside_band_and_spread(
        bids in book(),
        asks in book(),
        mid in 50i64..=150,
        ratio in 0u32..=50,
    ) {
        let band = PriceBand::around(Decimal::new(mid, 1), ratio).unwrap();
        let mut bids = build(OrderSide::Bid, "buyer", &bids);
        let mut asks = build(OrderSide::Ask, "seller", &asks);

        let outcome = match_orders(&band, &mut bids, &mut asks).unwrap();

        for deal in &outcome.deals {
            prop_assert!(band.contains(deal.price), "{deal} outside [{}, {}]", band.low, band.high);
            let bid = bids.iter().find(|o| o.id == deal.buyer_order_id).unwrap();
            let ask = asks.iter().find(|o| o.id == deal.seller_order_id).unwrap();
            prop_assert!(ask.price <= deal.price && deal.price <= bid.price);
            prop_assert!(deal.quantity > 0);
        }
        match outcome.deals.last() {
            Some(last) => prop_assert_eq!(outcome.last_price, last.price),
            None => prop_assert_eq!(outcome.last_price, Decimal::ZERO),
        }
    }

    #[test]
    fn input_order_does_not_change_deals(
        bids in book(),
        asks in book(),
        mid in 50i64..=150,
        ratio in 0u32..=50,
        seed in any::<u64>(),
    ) {
        let band = PriceBand::around(Decimal::new(mid, 1), ratio).unwrap();
        let mut bids_a = build(OrderSide::Bid, "buyer", &bids);
        let mut asks_a = build(OrderSide::Ask, "seller", &asks);
        let mut bids_b = bids_a.clone();
        let mut asks_b = asks_a.clone();

        let mut rng = StdRng::seed_from_u64(seed);
        bids_b.shuffle(&mut rng);
        asks_b.shuffle(&mut rng);

        let a = match_orders(&band, &mut bids_a, &mut asks_a).unwrap();
        let b = match_orders(&band, &mut bids_b, &mut asks_b).unwrap();

        prop_assert_eq!(
            compute_deal_root("abc/cet", &a.deals),
            compute_deal_root("abc/cet", &b.deals)
        );
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(bids_a, bids_b);
        prop_assert_eq!(asks_a, asks_b);
    }
}

#[test]
fn repeated_runs_are_byte_identical() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut quotes: Vec<Quote> = (0..40).map(|i| (80 + (i * 7) % 50, 1 + (i as u64 * 13) % 30, 1 + i as u64 % 5)).collect();
    quotes.shuffle(&mut rng);
    let (bid_quotes, ask_quotes) = quotes.split_at(20);

    let band = PriceBand::around(Decimal::new(100, 1), 25).unwrap();
    let mut roots = Vec::new();
    for _ in 0..5 {
        let mut bids = build(OrderSide::Bid, "buyer", bid_quotes);
        let mut asks = build(OrderSide::Ask, "seller", ask_quotes);
        let outcome = match_orders(&band, &mut bids, &mut asks).unwrap();
        assert!(outcome.traded());
        roots.push(compute_deal_root("abc/cet", &outcome.deals));
    }
    assert!(roots.windows(2).all(|w| w[0] == w[1]));
}
