//! # dexmatch-settlement
//!
//! Moves escrowed funds for the deals a matching round produced.
//!
//! The matcher only rewrites order fill state; this crate replays each deal
//! against the [`dexmatch_types::EscrowLedger`]:
//! 1. Unfreeze the seller's stock and transfer it to the buyer
//! 2. Unfreeze the buyer's money and transfer it to the seller
//!
//! and returns leftover collateral when an order leaves the book.
//!
//! Any ledger rejection here means escrow and order state disagree, so every
//! error is surfaced as fatal ([`dexmatch_types::DexmatchError::LedgerRejected`]).

pub mod conservation;
pub mod executor;
pub mod release;

pub use conservation::SupplyConservation;
pub use executor::settle_deal;
pub use release::release_collateral;
