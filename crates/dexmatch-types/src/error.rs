//! Error types for the DexMatch block matcher.
//!
//! All errors use the `DM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order / input errors
//! - 2xx: Ledger errors
//! - 3xx: Market errors
//! - 5xx: Matching errors
//! - 6xx: Settlement errors
//! - 9xx: Configuration / internal errors
//!
//! Errors are either **recoverable** (the caller sent something malformed,
//! nothing was mutated) or **fatal** (the node would diverge from its peers
//! if it kept going). See [`DexmatchError::is_fatal`].

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, OrderId};

/// Central error enum for all DexMatch operations.
#[derive(Debug, Error)]
pub enum DexmatchError {
    // =================================================================
    // Order / Input Errors (1xx)
    // =================================================================
    /// The requested order was not found in the store.
    #[error("DM_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order failed validation (zero quantity, bad price, etc.).
    #[error("DM_ERR_101: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// An order with this ID already exists.
    #[error("DM_ERR_102: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// A market symbol could not be parsed as `STOCK/MONEY`.
    #[error("DM_ERR_103: Malformed market symbol: {0}")]
    MalformedSymbol(String),

    // =================================================================
    // Ledger Errors (2xx)
    // =================================================================
    /// Not enough available balance to freeze or transfer.
    #[error("DM_ERR_200: Insufficient available {denom} for {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        owner: AccountId,
        denom: String,
        needed: u64,
        available: u64,
    },

    /// Not enough frozen balance to unfreeze.
    #[error("DM_ERR_201: Insufficient frozen {denom} for {owner}: need {needed}, have {frozen}")]
    InsufficientFrozen {
        owner: AccountId,
        denom: String,
        needed: u64,
        frozen: u64,
    },

    /// A balance operation would overflow.
    #[error("DM_ERR_202: Balance overflow for {denom}")]
    BalanceOverflow { denom: String },

    // =================================================================
    // Market Errors (3xx)
    // =================================================================
    /// No market is registered under this symbol.
    #[error("DM_ERR_300: Unknown market: {0}")]
    UnknownMarket(String),

    /// A market with this symbol already exists.
    #[error("DM_ERR_301: Market already exists: {0}")]
    DuplicateMarket(String),

    /// The market definition is invalid.
    #[error("DM_ERR_302: Invalid market: {reason}")]
    InvalidMarket { reason: String },

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// The price band does not satisfy `0 <= low <= mid <= high`.
    #[error("DM_ERR_500: Invalid price band: low={low}, mid={mid}, high={high}")]
    InvalidPriceBand {
        low: Decimal,
        mid: Decimal,
        high: Decimal,
    },

    /// Decimal or integer arithmetic overflowed.
    #[error("DM_ERR_501: Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// An order or balance invariant no longer holds.
    #[error("DM_ERR_502: Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// Cross-node determinism check failed.
    #[error("DM_ERR_503: Determinism violation: expected {expected}, got {actual}")]
    DeterminismViolation { expected: String, actual: String },

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// The escrow ledger refused a settlement or release step.
    #[error("DM_ERR_600: Ledger rejected {operation} for order {order_id}: {reason}")]
    LedgerRejected {
        operation: &'static str,
        order_id: OrderId,
        reason: String,
    },

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("DM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("DM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid params, missing fields, etc.).
    #[error("DM_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl DexmatchError {
    /// Whether this error must halt block processing.
    ///
    /// Fatal errors mean this node can no longer guarantee it computes the
    /// same block result as its peers. Everything else is an input rejection
    /// that leaves state untouched.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InsufficientFrozen { .. }
                | Self::BalanceOverflow { .. }
                | Self::ArithmeticOverflow(_)
                | Self::InvariantViolation { .. }
                | Self::DeterminismViolation { .. }
                | Self::LedgerRejected { .. }
                | Self::Internal(_)
        )
    }

    /// Shorthand for [`DexmatchError::InvariantViolation`].
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DexmatchError>;

impl From<serde_json::Error> for DexmatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
