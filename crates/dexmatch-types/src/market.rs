//! Per-market state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{DexmatchError, MarketPair, Result};

/// One trading pair and its reference price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub pair: MarketPair,
    /// Price of the last executed deal; the centre of the next price band.
    pub last_executed_price: Decimal,
}

impl MarketInfo {
    /// # Errors
    /// Returns [`DexmatchError::InvalidMarket`] if stock and money are the
    /// same denomination or the reference price is not positive.
    pub fn new(pair: MarketPair, last_executed_price: Decimal) -> Result<Self> {
        let info = Self {
            pair,
            last_executed_price,
        };
        info.validate()?;
        Ok(info)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pair.stock == self.pair.money {
            return Err(DexmatchError::InvalidMarket {
                reason: format!("stock and money are both {}", self.pair.stock),
            });
        }
        if self.last_executed_price <= Decimal::ZERO {
            return Err(DexmatchError::InvalidMarket {
                reason: format!(
                    "{}: reference price must be positive, got {}",
                    self.pair, self.last_executed_price
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        self.pair.symbol()
    }
}
