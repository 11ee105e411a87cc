//! System-wide constants for the DexMatch block matcher.

/// Default lifetime of a good-till-expire order, in blocks.
pub const DEFAULT_GTE_ORDER_LIFETIME: u64 = 10_000;

/// Default maximum deviation of an execution price from the reference
/// price, in percent.
pub const DEFAULT_MAX_EXECUTED_PRICE_CHANGE_RATIO: u32 = 25;

/// Upper bound for the price change ratio (percent).
pub const MAX_PRICE_CHANGE_RATIO: u32 = 100;

/// Domain separator for deal-root hashing.
pub const DEAL_ROOT_DOMAIN: &[u8] = b"dexmatch:deal_root:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
