//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by subtracting the specified number of seconds.
    ///
    /// Saturates at the earliest representable time.
    pub fn minus_secs(&self, secs: u64) -> Self {
        let shifted = span(secs).and_then(|span| self.0.checked_sub_signed(span));
        Self(shifted.unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    ///
    /// Saturates at the latest representable time.
    pub fn plus_secs(&self, secs: u64) -> Self {
        let shifted = span(secs).and_then(|span| self.0.checked_add_signed(span));
        Self(shifted.unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Returns true if more than `secs` seconds separate `now` from this timestamp.
    ///
    /// A limit too large for a `chrono::Duration` is never exceeded.
    pub fn is_older_than(&self, secs: u64, now: &Timestamp) -> bool {
        match span(secs) {
            Some(limit) => now.duration_since(self) > limit,
            None => false,
        }
    }
}

fn span(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
