//! Deal records produced by the matching engine.
//!
//! A [`Deal`] is ephemeral: it drives settlement and then disappears. Only
//! its effects (ledger movements, order fill state, the market's reference
//! price) persist.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OrderId;

/// One matched trade between a bid and an ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// The BID order.
    pub buyer_order_id: OrderId,
    /// The ASK order.
    pub seller_order_id: OrderId,
    /// Stock traded.
    pub quantity: u64,
    /// Execution price.
    pub price: Decimal,
    /// Money paid by the buyer for `quantity` at `price`.
    pub money: u64,
}

impl std::fmt::Display for Deal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Deal[{} <- {}] {} @ {} = {}",
            self.buyer_order_id, self.seller_order_id, self.quantity, self.price, self.money,
        )
    }
}
