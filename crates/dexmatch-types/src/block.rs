//! Block context handed to the driver by the host state machine.
//!
//! Each finalized block runs in exactly one of two modes:
//! **EXPIRY** on the first block of a new calendar day, **MATCHING** on
//! every other block.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Height and timestamp of the block being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: u64,
    pub time: DateTime<Utc>,
}

impl BlockContext {
    #[must_use]
    pub fn new(height: u64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }

    /// Calendar day of the block timestamp (days since 0001-01-01, UTC).
    #[must_use]
    pub fn calendar_day(&self) -> i32 {
        self.time.num_days_from_ce()
    }
}

/// The two mutually exclusive per-block modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockMode {
    /// Remove orders older than the GTE lifetime; no matching.
    Expiry,
    /// Match every tradable market and settle the deals.
    Matching,
}

impl fmt::Display for BlockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expiry => write!(f, "EXPIRY"),
            Self::Matching => write!(f, "MATCHING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn same_day_same_calendar_day() {
        let morning = BlockContext::new(1, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 1).unwrap());
        let night = BlockContext::new(2, Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap());
        assert_eq!(morning.calendar_day(), night.calendar_day());
    }

    #[test]
    fn same_day_of_month_in_different_months_differs() {
        let march = BlockContext::new(1, Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap());
        let april = BlockContext::new(2, Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap());
        assert_ne!(march.calendar_day(), april.calendar_day());
    }

    #[test]
    fn block_mode_display() {
        assert_eq!(BlockMode::Expiry.to_string(), "EXPIRY");
        assert_eq!(BlockMode::Matching.to_string(), "MATCHING");
    }
}
