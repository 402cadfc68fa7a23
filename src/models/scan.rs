//! Classified scan results.

use super::Identifier;
use chrono::{DateTime, Utc};

/// Canonical textual timestamp format exchanged at the result-sink boundary.
pub const BOUNDARY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether an incoming scan event was accepted or suppressed as a recent
/// duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fresh event: no prior acceptance inside the cooldown window.
    Accepted,
    /// Duplicate event inside the cooldown window; no state was changed.
    Suppressed,
}

/// Outcome of the reference-set lookup for an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The identifier is present in the active reference set.
    Found,
    /// The identifier is absent (or no reference set is loaded).
    NotFound,
    /// No lookup was performed; suppressed events skip it.
    NotChecked,
}

/// A classified scan event.
///
/// Produced exactly once per accepted `classify` call, immutable after
/// creation; ownership passes to the event channel and then to the consumer.
/// The `Suppressed` decision always carries `MatchOutcome::NotChecked`,
/// which the constructors enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The parsed identifier.
    pub identifier: Identifier,
    /// Accept/suppress decision.
    pub decision: Decision,
    /// Reference-set lookup outcome.
    pub outcome: MatchOutcome,
    /// When the classification happened.
    pub timestamp: DateTime<Utc>,
}

impl Classification {
    /// Creates an accepted classification with the given lookup outcome.
    #[must_use]
    pub const fn accepted(identifier: Identifier, found: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            identifier,
            decision: Decision::Accepted,
            outcome: if found {
                MatchOutcome::Found
            } else {
                MatchOutcome::NotFound
            },
            timestamp,
        }
    }

    /// Creates a suppressed classification. No lookup outcome is attached.
    #[must_use]
    pub const fn suppressed(identifier: Identifier, timestamp: DateTime<Utc>) -> Self {
        Self {
            identifier,
            decision: Decision::Suppressed,
            outcome: MatchOutcome::NotChecked,
            timestamp,
        }
    }

    /// Returns true if this event was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.decision == Decision::Accepted
    }

    /// Renders the timestamp in the boundary format `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn boundary_timestamp(&self) -> String {
        self.timestamp.format(BOUNDARY_TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_accepted_found() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let c = Classification::accepted(Identifier::new(42), true, ts);
        assert!(c.is_accepted());
        assert_eq!(c.outcome, MatchOutcome::Found);
    }

    #[test]
    fn test_accepted_not_found() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let c = Classification::accepted(Identifier::new(99), false, ts);
        assert_eq!(c.outcome, MatchOutcome::NotFound);
    }

    #[test]
    fn test_suppressed_never_carries_lookup() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let c = Classification::suppressed(Identifier::new(42), ts);
        assert!(!c.is_accepted());
        assert_eq!(c.outcome, MatchOutcome::NotChecked);
    }

    #[test]
    fn test_boundary_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        let c = Classification::suppressed(Identifier::new(1), ts);
        assert_eq!(c.boundary_timestamp(), "2024-03-01 09:05:07");
    }
}
