//! Matching parameters.

use serde::{Deserialize, Serialize};

use crate::{DexmatchError, Result, constants};

/// Parameters the driver reads every block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParams {
    /// Blocks a good-till-expire order may rest before expiry removes it.
    pub gte_order_lifetime: u64,
    /// Half-width of the price band around the reference price, in percent.
    pub max_executed_price_change_ratio: u32,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            gte_order_lifetime: constants::DEFAULT_GTE_ORDER_LIFETIME,
            max_executed_price_change_ratio: constants::DEFAULT_MAX_EXECUTED_PRICE_CHANGE_RATIO,
        }
    }
}

impl MarketParams {
    /// Parse and validate params from JSON. Missing fields take defaults.
    ///
    /// # Errors
    /// [`DexmatchError::Serialization`] for malformed JSON,
    /// [`DexmatchError::Configuration`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gte_order_lifetime == 0 {
            return Err(DexmatchError::Configuration(
                "gte_order_lifetime must be positive".into(),
            ));
        }
        if self.max_executed_price_change_ratio > constants::MAX_PRICE_CHANGE_RATIO {
            return Err(DexmatchError::Configuration(format!(
                "max_executed_price_change_ratio {} exceeds {}",
                self.max_executed_price_change_ratio,
                constants::MAX_PRICE_CHANGE_RATIO
            )));
        }
        Ok(())
    }
}
