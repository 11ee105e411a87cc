//! Exact money arithmetic.
//!
//! Every node must turn `price × quantity` into the same integer amount of
//! the money token. The rule is fixed here and nowhere else: multiply
//! exactly in fixed point, then round half away from zero to an integer.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{DexmatchError, Result};

/// Integer money owed for `quantity` units of stock at `price`.
///
/// `round(price × quantity)` using [`RoundingStrategy::MidpointAwayFromZero`].
///
/// # Errors
/// Returns [`DexmatchError::ArithmeticOverflow`] if the product does not fit
/// a `Decimal` or the rounded result does not fit a `u64` (including a
/// negative price).
pub fn money_amount(price: Decimal, quantity: u64) -> Result<u64> {
    let notional = price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| DexmatchError::ArithmeticOverflow(format!("{price} x {quantity}")))?;
    notional
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| DexmatchError::ArithmeticOverflow(format!("{notional} does not fit u64")))
}
