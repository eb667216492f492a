//! Deterministic `Clock` for tests that pin or fast-forward time.

use chrono::{DateTime, Duration, Utc};
use wildshot_core::clock::Clock;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// A clock frozen `secs` seconds after this one. Used to step past an
    /// expedition countdown.
    #[must_use]
    pub fn later(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
