//! Timestamp-based identifiers.

use chrono::{DateTime, Utc};

/// Hands out millisecond timestamps as ids, bumping past the last issued
/// value so two creations in the same millisecond still differ.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Records an id that already exists so it is never issued again.
    pub(crate) fn observe(&mut self, id: &str) {
        if let Ok(value) = id.parse::<i64>() {
            self.last = self.last.max(value);
        }
    }

    pub(crate) fn next(&mut self, now: DateTime<Utc>) -> String {
        let candidate = now.timestamp_millis();
        self.last = if candidate > self.last {
            candidate
        } else {
            self.last + 1
        };
        self.last.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_instant_still_yields_distinct_ids() {
        let now = Utc::now();
        let mut ids = IdGenerator::default();
        let first = ids.next(now);
        let second = ids.next(now);
        assert_ne!(first, second);
        assert!(second.parse::<i64>().unwrap() > first.parse::<i64>().unwrap());
    }

    #[test]
    fn observed_ids_from_the_future_are_skipped() {
        let now = Utc::now();
        let ahead = (now.timestamp_millis() + 60_000).to_string();
        let mut ids = IdGenerator::default();
        ids.observe(&ahead);
        ids.observe("not-a-number");
        let next = ids.next(now);
        assert_eq!(next.parse::<i64>().unwrap(), ahead.parse::<i64>().unwrap() + 1);
    }
}
