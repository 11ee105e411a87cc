//! The price band around a market's reference price.
//!
//! ```text
//! low  = mid × (100 − ratio) / 100
//! high = mid × (100 + ratio) / 100
//! ```
//!
//! Every deal in a round must execute inside `[low, high]`.

use dexmatch_types::{DexmatchError, Result};
use rust_decimal::Decimal;

/// Inclusive execution-price bounds for one matching round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub low: Decimal,
    pub mid: Decimal,
    pub high: Decimal,
}

impl PriceBand {
    /// # Errors
    /// Returns [`DexmatchError::InvalidPriceBand`] unless `0 <= low <= mid <= high`.
    pub fn new(low: Decimal, mid: Decimal, high: Decimal) -> Result<Self> {
        if low < Decimal::ZERO || low > mid || mid > high {
            return Err(DexmatchError::InvalidPriceBand { low, mid, high });
        }
        Ok(Self { low, mid, high })
    }

    /// Band of `±ratio_percent` around `mid`.
    pub fn around(mid: Decimal, ratio_percent: u32) -> Result<Self> {
        let overflow = || DexmatchError::ArithmeticOverflow(format!("band {mid} ± {ratio_percent}%"));
        let ratio = Decimal::from(ratio_percent);
        let low = mid
            .checked_mul(Decimal::ONE_HUNDRED - ratio)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(overflow)?;
        let high = mid
            .checked_mul(Decimal::ONE_HUNDRED + ratio)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(overflow)?;
        Self::new(low, mid, high)
    }

    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.low <= price && price <= self.high
    }

    /// Prices at which a bid at `bid_price` and an ask at `ask_price` may
    /// trade inside this band: `[max(low, ask), min(high, bid)]`.
    ///
    /// `None` when the interval is empty.
    #[must_use]
    pub fn execution_interval(&self, bid_price: Decimal, ask_price: Decimal) -> Option<(Decimal, Decimal)> {
        let floor = self.low.max(ask_price);
        let ceiling = self.high.min(bid_price);
        (floor <= ceiling).then_some((floor, ceiling))
    }
}
