//! Deal roots for cross-node comparison.
//!
//! Every node processing the same block must produce the same deals in the
//! same order. The deal root hashes a market's deal sequence so two nodes can
//! compare 32 bytes instead of full payloads; [`combine_roots`] folds the
//! per-market roots of a block into one.

use dexmatch_types::constants::DEAL_ROOT_DOMAIN;
use dexmatch_types::{Deal, DexmatchError, Result};
use sha2::{Digest, Sha256};

/// Hash one market's deal sequence.
///
/// Depends on the market symbol, deal count, and for each deal (in order)
/// both order ids, quantity, price and money.
#[must_use]
pub fn compute_deal_root(symbol: &str, deals: &[Deal]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DEAL_ROOT_DOMAIN);
    update_str(&mut hasher, symbol);
    hasher.update((deals.len() as u64).to_le_bytes());

    for deal in deals {
        update_str(&mut hasher, deal.buyer_order_id.owner.as_str());
        hasher.update(deal.buyer_order_id.sequence.to_le_bytes());
        update_str(&mut hasher, deal.seller_order_id.owner.as_str());
        hasher.update(deal.seller_order_id.sequence.to_le_bytes());
        hasher.update(deal.quantity.to_le_bytes());
        // normalized so 10 and 10.00 hash alike
        update_str(&mut hasher, &deal.price.normalize().to_string());
        hasher.update(deal.money.to_le_bytes());
    }

    finish(hasher)
}

/// Fold per-market roots into a block root. Callers pass markets in symbol
/// order.
#[must_use]
pub fn combine_roots(roots: &[(String, [u8; 32])]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DEAL_ROOT_DOMAIN);
    hasher.update(b"block:");
    hasher.update((roots.len() as u64).to_le_bytes());
    for (symbol, root) in roots {
        update_str(&mut hasher, symbol);
        hasher.update(root);
    }
    finish(hasher)
}

/// Recompute a market's deal root and compare.
///
/// # Errors
/// [`DexmatchError::DeterminismViolation`] carrying both roots as hex.
pub fn verify_deal_root(symbol: &str, deals: &[Deal], expected: &[u8; 32]) -> Result<()> {
    let actual = compute_deal_root(symbol, deals);
    if actual == *expected {
        Ok(())
    } else {
        Err(DexmatchError::DeterminismViolation {
            expected: root_hex(expected),
            actual: root_hex(&actual),
        })
    }
}

#[must_use]
pub fn root_hex(root: &[u8; 32]) -> String {
    hex::encode(root)
}

fn finish(hasher: Sha256) -> [u8; 32] {
    let mut root = [0u8; 32];
    root.copy_from_slice(&hasher.finalize());
    root
}

// Length-prefixed so adjacent strings cannot run together.
fn update_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
