//! Interfaces of the collaborators the matcher depends on but does not own.
//!
//! Both are synchronous, in-process calls. Handles are passed into the
//! driver for each block; nothing here is a global.

use crate::{AccountId, Result};

/// Account balance storage with an escrow (frozen) bucket per denomination.
///
/// All amounts are exact integers. An implementation must fail (never
/// clamp) when the owner's frozen or available balance is insufficient;
/// the driver treats any such failure as fatal.
pub trait EscrowLedger {
    /// Move `amount` of `denom` from available to frozen.
    fn freeze(&mut self, owner: &AccountId, denom: &str, amount: u64) -> Result<()>;

    /// Move `amount` of `denom` from frozen back to available.
    fn unfreeze(&mut self, owner: &AccountId, denom: &str, amount: u64) -> Result<()>;

    /// Move `amount` of available `denom` from one account to another.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, denom: &str, amount: u64)
    -> Result<()>;
}

/// Issuer-level token controls.
pub trait TokenPolicy {
    /// Whether the token is globally frozen by its issuer.
    fn is_token_frozen(&self, denom: &str) -> bool;

    /// Whether the issuer forbids `owner` from moving `denom`.
    fn is_forbidden_by_sender_policy(&self, denom: &str, owner: &AccountId) -> bool;
}
