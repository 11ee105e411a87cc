//! # dexmatch-matchcore
//!
//! **Pure deterministic matching for DexMatch.**
//!
//! MatchCore is the compute plane -- it takes the resting orders of one
//! market and the market's price band and produces a deterministic list of
//! deals. It has:
//!
//! - **Zero side effects**: no ledger calls, no store writes
//! - **Deterministic output**: same input -> same deals on every node
//! - **Bounded price impact**: every deal executes inside the price band
//! - **Market sharding**: each market is matched independently

pub mod determinism;
pub mod eligibility;
pub mod matcher;
pub mod price_band;

pub use determinism::{combine_roots, compute_deal_root, root_hex, verify_deal_root};
pub use eligibility::filter_candidates;
pub use matcher::{MatchOutcome, match_orders, sort_asks, sort_bids};
pub use price_band::PriceBand;
