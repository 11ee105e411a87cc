//! Issuer-level token controls.

use std::collections::BTreeSet;

use dexmatch_types::{AccountId, Denom, TokenPolicy};

/// In-memory [`TokenPolicy`]: globally frozen tokens plus per-address send
/// bans set by token issuers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetStatus {
    frozen_tokens: BTreeSet<Denom>,
    forbidden: BTreeSet<(Denom, AccountId)>,
}

impl AssetStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn freeze_token(&mut self, denom: &str) {
        self.frozen_tokens.insert(denom.to_string());
    }

    pub fn unfreeze_token(&mut self, denom: &str) {
        self.frozen_tokens.remove(denom);
    }

    /// Forbid `owner` from sending `denom`.
    pub fn forbid_address(&mut self, denom: &str, owner: &AccountId) {
        self.forbidden.insert((denom.to_string(), owner.clone()));
    }

    pub fn allow_address(&mut self, denom: &str, owner: &AccountId) {
        self.forbidden.remove(&(denom.to_string(), owner.clone()));
    }
}

impl TokenPolicy for AssetStatus {
    fn is_token_frozen(&self, denom: &str) -> bool {
        self.frozen_tokens.contains(denom)
    }

    fn is_forbidden_by_sender_policy(&self, denom: &str, owner: &AccountId) -> bool {
        self.forbidden.contains(&(denom.to_string(), owner.clone()))
    }
}
