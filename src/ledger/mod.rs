//! Per-identifier dedup ledger with a fixed cooldown window.
//!
//! The ledger records the last accepted timestamp for each identifier and
//! decides whether a new event is fresh or a suppressed duplicate. Scan
//! throughput is bounded by camera frame rate and human entry, so the whole
//! map sits behind a single mutex and correctness wins over contention.

use crate::models::Identifier;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};

/// Default cooldown window in seconds (15 minutes).
pub const DEFAULT_COOLDOWN_SECS: i64 = 15 * 60;

/// Last-accepted-timestamp store deciding accept/suppress per identifier.
///
/// # Semantics
///
/// `try_accept` is a single atomic check-and-update: when two producers
/// submit the same identifier at the same instant, exactly one wins. The
/// cooldown is closed-open; an entry whose age equals the window exactly is
/// eligible again (`age >= window` accepts). Suppression never touches the
/// stored timestamp.
///
/// # Lock Poisoning
///
/// A poisoned lock is recovered with `PoisonError::into_inner`: the map
/// holds only plain timestamps, so no invariant can be left half-written by
/// a panicking thread.
pub struct DedupLedger {
    entries: Mutex<HashMap<Identifier, DateTime<Utc>>>,
    window: Duration,
}

impl DedupLedger {
    /// Creates a ledger with the given cooldown window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Creates a ledger with the default 15-minute cooldown.
    #[must_use]
    pub fn with_default_cooldown() -> Self {
        Self::new(Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }

    /// Returns the configured cooldown window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Atomically decides whether an event for `id` at `now` is fresh.
    ///
    /// Returns `true` and records `now` as the identifier's last-accepted
    /// time if no prior entry exists or the prior entry's age is at least
    /// the window. Returns `false` and leaves the entry untouched otherwise.
    #[instrument(skip(self), fields(operation = "try_accept", id = %id))]
    pub fn try_accept(&self, id: Identifier, now: DateTime<Utc>) -> bool {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let accepted = match entries.get(&id) {
            Some(last) if now.signed_duration_since(*last) < self.window => false,
            _ => {
                entries.insert(id, now);
                true
            },
        };

        if accepted {
            metrics::counter!("ledger_accepted_total").increment(1);
            metrics::gauge!("ledger_entries").set(entries_len_f64(entries.len()));
        } else {
            metrics::counter!("ledger_suppressed_total").increment(1);
        }

        debug!(accepted, "ledger decision");
        accepted
    }

    /// Removes entries whose age at `now` is at least the cooldown window.
    ///
    /// Safe with respect to decisions: any removed entry would have been
    /// re-accepted anyway. Returns the number of entries removed.
    #[instrument(skip(self), fields(operation = "prune_expired"))]
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let before = entries.len();
        entries.retain(|_, last| now.signed_duration_since(*last) < self.window);
        let pruned = before - entries.len();

        metrics::counter!("ledger_pruned_total").increment(pruned as u64);
        metrics::gauge!("ledger_entries").set(entries_len_f64(entries.len()));

        if pruned > 0 {
            debug!(pruned, remaining = entries.len(), "pruned expired entries");
        }
        pruned
    }

    /// Returns the current number of tracked identifiers.
    ///
    /// Includes entries past their cooldown that have not been pruned yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no identifiers are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DedupLedger {
    fn default() -> Self {
        Self::with_default_cooldown()
    }
}

/// Converts a map length to f64 for metrics, capping at `u32::MAX`.
#[inline]
fn entries_len_f64(len: usize) -> f64 {
    let capped = u32::try_from(len).unwrap_or(u32::MAX);
    f64::from(capped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::thread;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn window() -> Duration {
        Duration::minutes(15)
    }

    #[test]
    fn test_first_event_accepted() {
        let ledger = DedupLedger::new(window());
        assert!(ledger.try_accept(Identifier::new(42), t0()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_duplicate_within_window_suppressed() {
        let ledger = DedupLedger::new(window());
        assert!(ledger.try_accept(Identifier::new(42), t0()));
        assert!(!ledger.try_accept(Identifier::new(42), t0() + Duration::minutes(5)));
    }

    #[test]
    fn test_suppression_leaves_timestamp_unchanged() {
        let ledger = DedupLedger::new(window());
        assert!(ledger.try_accept(Identifier::new(42), t0()));
        // Suppressed at +10min; if that had refreshed the entry, the event
        // at +16min (inside 10+15) would also be suppressed.
        assert!(!ledger.try_accept(Identifier::new(42), t0() + Duration::minutes(10)));
        assert!(ledger.try_accept(Identifier::new(42), t0() + Duration::minutes(16)));
    }

    #[test]
    fn test_boundary_age_equal_to_window_accepts() {
        let ledger = DedupLedger::new(window());
        assert!(ledger.try_accept(Identifier::new(42), t0()));
        assert!(ledger.try_accept(Identifier::new(42), t0() + window()));
    }

    #[test]
    fn test_reacceptance_updates_timestamp() {
        let ledger = DedupLedger::new(window());
        assert!(ledger.try_accept(Identifier::new(42), t0()));
        assert!(ledger.try_accept(Identifier::new(42), t0() + Duration::minutes(16)));
        // The clock now runs from the second acceptance.
        assert!(!ledger.try_accept(Identifier::new(42), t0() + Duration::minutes(17)));
    }

    #[test]
    fn test_distinct_identifiers_independent() {
        let ledger = DedupLedger::new(window());
        assert!(ledger.try_accept(Identifier::new(1), t0()));
        assert!(ledger.try_accept(Identifier::new(2), t0()));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let ledger = DedupLedger::new(window());
        ledger.try_accept(Identifier::new(1), t0());
        ledger.try_accept(Identifier::new(2), t0() + Duration::minutes(10));

        let pruned = ledger.prune_expired(t0() + Duration::minutes(15));
        assert_eq!(pruned, 1);
        assert_eq!(ledger.len(), 1);

        // The surviving entry still suppresses.
        assert!(!ledger.try_accept(Identifier::new(2), t0() + Duration::minutes(16)));
    }

    #[test]
    fn test_prune_empty_ledger() {
        let ledger = DedupLedger::new(window());
        assert_eq!(ledger.prune_expired(t0()), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_concurrent_same_identifier_single_winner() {
        let ledger = Arc::new(DedupLedger::new(window()));
        let now = t0();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.try_accept(Identifier::new(42), now))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&a| a)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_identifiers_all_accepted() {
        let ledger = Arc::new(DedupLedger::new(window()));
        let now = t0();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.try_accept(Identifier::new(i), now))
            })
            .collect();

        assert!(handles.into_iter().all(|h| h.join().unwrap()));
        assert_eq!(ledger.len(), 8);
    }
}
