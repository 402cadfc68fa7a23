//! Manual-entry ingest adapter.

use crate::channel::ClassificationSender;
use crate::models::Classification;
use crate::services::ClassifierService;
use crate::{Error, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// One-shot producer for user-typed identifiers.
///
/// Performs exactly one classification per submission. Empty input is a
/// user-facing [`Error::InvalidInput`] rejected before the classifier is
/// consulted, never a crash.
pub struct ManualEntry {
    classifier: Arc<ClassifierService>,
    sender: ClassificationSender,
}

impl ManualEntry {
    /// Creates a manual-entry adapter producing into `sender`.
    #[must_use]
    pub fn new(classifier: Arc<ClassifierService>, sender: ClassificationSender) -> Self {
        Self { classifier, sender }
    }

    /// Classifies one submission and delivers the result to the consumer.
    ///
    /// Returns a copy of the classification so the submitting surface can
    /// echo it immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for empty or non-numeric input and
    /// [`Error::ChannelClosed`] if the consumer is gone.
    #[instrument(skip_all, fields(operation = "manual_entry"))]
    pub async fn submit(&self, raw: &str) -> Result<Classification> {
        if raw.trim().is_empty() {
            metrics::counter!("manual_empty_submissions_total").increment(1);
            return Err(Error::InvalidInput(
                "manual entry must not be empty".to_string(),
            ));
        }

        let classification = self.classifier.classify(raw, Utc::now())?;
        self.sender.send(classification.clone()).await?;
        Ok(classification)
    }
}
