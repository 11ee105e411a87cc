//! # dexmatch-types
//!
//! Shared types, errors, and configuration for the **DexMatch** block matcher.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`OrderId`], [`MarketPair`]
//! - **Order model**: [`Order`], [`OrderSide`], [`TimeInForce`]
//! - **Deal model**: [`Deal`]
//! - **Market model**: [`MarketInfo`]
//! - **Block context**: [`BlockContext`]
//! - **Balance model**: [`BalanceEntry`], [`Denom`]
//! - **Configuration**: [`MarketParams`]
//! - **Exact money arithmetic**: [`money_amount`]
//! - **Collaborators**: [`EscrowLedger`], [`TokenPolicy`]
//! - **Errors**: [`DexmatchError`] with `DM_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod amount;
pub mod balance;
pub mod block;
pub mod collaborator;
pub mod config;
pub mod constants;
pub mod deal;
pub mod error;
pub mod ids;
pub mod market;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use dexmatch_types::{Order, OrderSide, Deal, MarketInfo, ...};

pub use amount::*;
pub use balance::*;
pub use block::*;
pub use collaborator::*;
pub use config::*;
pub use deal::*;
pub use error::*;
pub use ids::*;
pub use market::*;
pub use order::*;

// Constants are accessed via `dexmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
