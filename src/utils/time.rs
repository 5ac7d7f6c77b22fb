//! Time and timestamp utilities

use chrono::{DateTime, Duration, FixedOffset, SecondsFormat, Utc};
use parking_lot::Mutex;

/// Format an instant the way `stored` is emitted: RFC 3339, UTC, milliseconds
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a client-supplied ISO 8601 instant (must carry an offset)
pub fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Hands out strictly increasing `stored` instants.
///
/// If the wall clock stalls or steps backwards, the next value is the
/// previous one plus one millisecond.
#[derive(Debug)]
pub struct StoredClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl StoredClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Next instant, strictly after every instant previously returned
    pub fn next(&self) -> DateTime<Utc> {
        self.next_from(Utc::now())
    }

    fn next_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = truncate_millis(now);
        let mut last = self.last.lock();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

impl Default for StoredClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop sub-millisecond precision so formatted values keep the same order
fn truncate_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}
