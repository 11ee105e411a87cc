//! # dexmatch-market
//!
//! Persisted exchange state and the per-block driver.
//!
//! ## Architecture
//!
//! 1. **OrderStore**: resting orders keyed by market symbol, then order id
//! 2. **MarketKeeper**: markets, the order store, and the last cleanup day
//! 3. **end_block**: runs once per finalized block in EXPIRY or MATCHING mode
//! 4. **query**: read-only depth and order lookups for outer layers
//!
//! ## Block Flow
//!
//! ```text
//! first block of a day:  expire old orders -> release collateral -> sweep IOC
//! every other block:     candidates -> filter -> match -> settle -> commit -> sweep IOC
//! ```
//!
//! Every collection on these paths is a `BTreeMap` or an explicitly sorted
//! `Vec`, so all nodes walk markets and orders in the same sequence.

pub mod end_blocker;
pub mod keeper;
pub mod order_store;
pub mod query;

pub use end_blocker::{BlockReport, MarketRound, RemovalReason, RemovedOrder, end_block};
pub use keeper::{MarketKeeper, StateSnapshot};
pub use order_store::OrderStore;
pub use query::{DepthLevel, MarketDepth};
