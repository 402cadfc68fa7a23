//! Scan classification service.
//!
//! Parses raw payload text, consults the dedup ledger, and looks accepted
//! identifiers up in the active reference set.

use crate::ledger::DedupLedger;
use crate::models::{Classification, Identifier};
use crate::reference::ReferenceHandle;
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Service classifying raw scan payloads into typed results.
///
/// The classifier is the only writer of ledger state (delegated to
/// [`DedupLedger::try_accept`]) and never mutates the reference set.
/// Suppressed events skip the reference lookup entirely; matching a
/// known-recent duplicate against the dataset is redundant work.
pub struct ClassifierService {
    /// Dedup ledger shared with the sweeper.
    ledger: Arc<DedupLedger>,
    /// Active reference set publication point.
    reference: Arc<ReferenceHandle>,
}

impl ClassifierService {
    /// Creates a classifier over a shared ledger and reference handle.
    #[must_use]
    pub fn new(ledger: Arc<DedupLedger>, reference: Arc<ReferenceHandle>) -> Self {
        Self { ledger, reference }
    }

    /// Returns the ledger this classifier writes through.
    #[must_use]
    pub fn ledger(&self) -> &Arc<DedupLedger> {
        &self.ledger
    }

    /// Returns the reference handle this classifier reads.
    #[must_use]
    pub fn reference(&self) -> &Arc<ReferenceHandle> {
        &self.reference
    }

    /// Classifies one raw payload observed at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if `raw` is empty or
    /// non-numeric. Parse failures leave the ledger untouched.
    #[instrument(skip(self, raw), fields(operation = "classify"))]
    pub fn classify(&self, raw: &str, now: DateTime<Utc>) -> Result<Classification> {
        let start = Instant::now();
        let id = Identifier::parse(raw)?;

        let classification = if self.ledger.try_accept(id, now) {
            let found = self.reference.contains(id);
            metrics::counter!(
                "scan_classifications_total",
                "decision" => "accepted",
                "found" => if found { "true" } else { "false" }
            )
            .increment(1);
            Classification::accepted(id, found, now)
        } else {
            metrics::counter!(
                "scan_classifications_total",
                "decision" => "suppressed",
                "found" => "n/a"
            )
            .increment(1);
            Classification::suppressed(id, now)
        };

        let duration_ms = start.elapsed().as_millis();
        metrics::histogram!("scan_classify_duration_ms").record(duration_ms as f64);
        debug!(
            id = %id,
            decision = ?classification.decision,
            outcome = ?classification.outcome,
            duration_ms = %duration_ms,
            "classified scan event"
        );

        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, MatchOutcome};
    use crate::reference::ReferenceSet;
    use chrono::{Duration, TimeZone};

    fn classifier_with(keys: &[i64]) -> ClassifierService {
        ClassifierService::new(
            Arc::new(DedupLedger::new(Duration::minutes(15))),
            Arc::new(ReferenceHandle::with_set(ReferenceSet::from_keys(
                keys.iter().copied(),
            ))),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_accepted_found() {
        let classifier = classifier_with(&[42]);
        let result = classifier.classify("42", t0()).unwrap();
        assert_eq!(result.decision, Decision::Accepted);
        assert_eq!(result.outcome, MatchOutcome::Found);
        assert_eq!(result.timestamp, t0());
    }

    #[test]
    fn test_accepted_not_found() {
        let classifier = classifier_with(&[42]);
        let result = classifier.classify("99", t0()).unwrap();
        assert_eq!(result.decision, Decision::Accepted);
        assert_eq!(result.outcome, MatchOutcome::NotFound);
    }

    #[test]
    fn test_duplicate_suppressed_without_lookup() {
        let classifier = classifier_with(&[42]);
        classifier.classify("42", t0()).unwrap();

        let result = classifier
            .classify("42", t0() + Duration::minutes(5))
            .unwrap();
        assert_eq!(result.decision, Decision::Suppressed);
        assert_eq!(result.outcome, MatchOutcome::NotChecked);
    }

    #[test]
    fn test_reaccepted_after_window() {
        let classifier = classifier_with(&[42]);
        classifier.classify("42", t0()).unwrap();

        let result = classifier
            .classify("42", t0() + Duration::minutes(16))
            .unwrap();
        assert_eq!(result.decision, Decision::Accepted);
        assert_eq!(result.outcome, MatchOutcome::Found);
    }

    #[test]
    fn test_invalid_input_leaves_ledger_untouched() {
        let classifier = classifier_with(&[42]);
        let err = classifier.classify("abc", t0()).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidInput(_)));
        assert!(classifier.ledger().is_empty());

        // The identifier is still fresh afterwards.
        let result = classifier.classify("42", t0()).unwrap();
        assert_eq!(result.decision, Decision::Accepted);
    }

    #[test]
    fn test_no_reference_set_degrades_to_not_found() {
        let classifier = ClassifierService::new(
            Arc::new(DedupLedger::new(Duration::minutes(15))),
            Arc::new(ReferenceHandle::new()),
        );
        let result = classifier.classify("42", t0()).unwrap();
        assert_eq!(result.decision, Decision::Accepted);
        assert_eq!(result.outcome, MatchOutcome::NotFound);
    }
}
