//! # dexmatch-ledger
//!
//! Reference implementations of the two collaborators the block matcher
//! consumes but does not own:
//!
//! 1. **BalanceLedger**: available/frozen balances per (account, denom),
//!    implementing [`dexmatch_types::EscrowLedger`]
//! 2. **AssetStatus**: issuer token freezes and per-address send bans,
//!    implementing [`dexmatch_types::TokenPolicy`]
//!
//! A host chain with its own bank module implements the traits directly;
//! these types back tests and single-process deployments.
//!
//! ```text
//! place order -> BalanceLedger.freeze()
//! settle deal -> BalanceLedger.unfreeze() -> BalanceLedger.transfer()
//! ```

pub mod asset_status;
pub mod balance_ledger;

pub use asset_status::AssetStatus;
pub use balance_ledger::BalanceLedger;
