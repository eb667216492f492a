//! Expedition countdown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default time limit for an expedition, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 180;

/// Longest accepted time limit (one hour).
pub const MAX_TIME_LIMIT_SECS: u64 = 3_600;

/// A fixed time budget starting at `started_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    /// When the expedition started.
    pub started_at: DateTime<Utc>,
    /// Length of the budget in seconds.
    pub limit_secs: u64,
}

impl Countdown {
    /// Creates a countdown of `limit_secs` starting at `started_at`.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, limit_secs: u64) -> Self {
        Self {
            started_at,
            limit_secs,
        }
    }

    /// Whole seconds left at `now`, saturating at zero. A clock that reads
    /// earlier than `started_at` leaves the full budget.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0);
        self.limit_secs.saturating_sub(elapsed)
    }

    /// Whether the budget is used up at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }
}
