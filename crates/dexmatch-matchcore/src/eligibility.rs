//! Issuer-policy screening of matching candidates.

use dexmatch_types::{MarketPair, Order, TokenPolicy};

/// Drop every order whose owner the token policy forbids from sending either
/// side of `pair`.
///
/// Order-preserving; excluded orders stay in the store and are simply left
/// out of this round.
pub fn filter_candidates<P: TokenPolicy + ?Sized>(
    policy: &P,
    orders: Vec<Order>,
    pair: &MarketPair,
) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|order| {
            let owner = order.owner();
            let forbidden = policy.is_forbidden_by_sender_policy(&pair.stock, owner)
                || policy.is_forbidden_by_sender_policy(&pair.money, owner);
            if forbidden {
                tracing::debug!(order = %order.id, market = %pair, "owner forbidden by token policy");
            }
            !forbidden
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use dexmatch_types::*;
    use rust_decimal::Decimal;

    use super::*;

    #[derive(Default)]
    struct Forbidden(BTreeSet<(String, String)>);

    impl TokenPolicy for Forbidden {
        fn is_token_frozen(&self, _denom: &str) -> bool {
            false
        }

        fn is_forbidden_by_sender_policy(&self, denom: &str, owner: &AccountId) -> bool {
            self.0.contains(&(denom.to_string(), owner.to_string()))
        }
    }

    fn book() -> Vec<Order> {
        vec![
            Order::dummy("alice", 1, OrderSide::Bid, Decimal::TEN, 1),
            Order::dummy("bob", 1, OrderSide::Ask, Decimal::TEN, 1),
            Order::dummy("carol", 1, OrderSide::Bid, Decimal::TEN, 1),
        ]
    }

    #[test]
    fn nothing_forbidden_keeps_everything() {
        let pair = MarketPair::new("abc", "cet");
        let kept = filter_candidates(&Forbidden::default(), book(), &pair);
        assert_eq!(kept, book());
    }

    #[test]
    fn forbidden_on_either_denom_is_dropped() {
        let pair = MarketPair::new("abc", "cet");
        let mut policy = Forbidden::default();
        policy.0.insert(("abc".into(), "alice".into()));
        policy.0.insert(("cet".into(), "carol".into()));

        let kept = filter_candidates(&policy, book(), &pair);
        let owners: Vec<&str> = kept.iter().map(|o| o.owner().as_str()).collect();
        assert_eq!(owners, vec!["bob"]);
    }

    #[test]
    fn other_market_restrictions_do_not_apply() {
        let pair = MarketPair::new("abc", "cet");
        let mut policy = Forbidden::default();
        policy.0.insert(("xyz".into(), "alice".into()));
        assert_eq!(filter_candidates(&policy, book(), &pair).len(), 3);
    }
}
