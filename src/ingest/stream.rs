//! Continuous-stream ingest adapter.

use super::FrameSource;
use crate::channel::ClassificationSender;
use crate::services::ClassifierService;
use crate::{Error, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Default pause between empty polling cycles.
pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Continuous producer wrapping a [`FrameSource`].
///
/// Classifies every decoded payload and pushes the results onto the
/// channel. Per-event errors (bad payloads, transient decode failures) are
/// logged and skipped; only channel teardown ends the loop early. The stop
/// signal is observed between capture iterations, so an in-flight
/// classification always drains before shutdown.
pub struct StreamIngest {
    classifier: Arc<ClassifierService>,
    sender: ClassificationSender,
    poll_interval: Duration,
}

impl StreamIngest {
    /// Creates a stream adapter producing into `sender`.
    #[must_use]
    pub fn new(classifier: Arc<ClassifierService>, sender: ClassificationSender) -> Self {
        Self {
            classifier,
            sender,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the pause between empty polling cycles.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Runs the polling loop until `stop` flips to true or the channel
    /// closes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the consumer disappears while a
    /// result is pending. All other per-event failures are logged and the
    /// loop continues.
    #[instrument(skip_all, fields(operation = "stream_ingest"))]
    pub async fn run(
        &self,
        mut source: impl FrameSource,
        mut stop: watch::Receiver<bool>,
    ) -> Result<()> {
        info!("stream ingest started");

        loop {
            if *stop.borrow_and_update() {
                info!("stop signal observed, stream ingest draining out");
                return Ok(());
            }

            let payloads = match source.poll_decode() {
                Ok(payloads) => payloads,
                Err(Error::IoTransient(cause)) => {
                    // One bad frame never stops the stream.
                    metrics::counter!("stream_poll_transient_errors_total").increment(1);
                    warn!(%cause, "transient decode failure, continuing");
                    continue;
                },
                Err(e) => return Err(e),
            };

            if payloads.is_empty() {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }

            for raw in payloads {
                match self.classifier.classify(&raw, Utc::now()) {
                    Ok(classification) => self.sender.send(classification).await?,
                    Err(Error::InvalidInput(cause)) => {
                        metrics::counter!("stream_invalid_payloads_total").increment(1);
                        debug!(%cause, "skipped unparseable payload");
                    },
                    Err(e) => return Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel;
    use crate::ledger::DedupLedger;
    use crate::models::Decision;
    use crate::reference::{ReferenceHandle, ReferenceSet};

    fn classifier() -> Arc<ClassifierService> {
        Arc::new(ClassifierService::new(
            Arc::new(DedupLedger::default()),
            Arc::new(ReferenceHandle::with_set(ReferenceSet::from_keys([42]))),
        ))
    }

    #[tokio::test]
    async fn test_stream_classifies_and_stops() {
        let (tx, mut rx) = channel::bounded(16);
        let (stop_tx, stop_rx) = watch::channel(false);
        let ingest = StreamIngest::new(classifier(), tx);

        let mut batches = vec![vec!["42".to_string(), "99".to_string()]].into_iter();
        let source = move || -> crate::Result<Vec<String>> { Ok(batches.next().unwrap_or_default()) };

        let task = tokio::spawn(async move { ingest.run(source, stop_rx).await });

        assert_eq!(rx.recv().await.unwrap().identifier.value(), 42);
        assert_eq!(rx.recv().await.unwrap().identifier.value(), 99);

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_transient_errors_are_skipped() {
        let (tx, mut rx) = channel::bounded(16);
        let (stop_tx, stop_rx) = watch::channel(false);
        let ingest = StreamIngest::new(classifier(), tx);

        let mut cycle = 0;
        let source = move || {
            cycle += 1;
            match cycle {
                1 => Err(Error::IoTransient("camera hiccup".to_string())),
                2 => Ok(vec!["42".to_string()]),
                _ => Ok(Vec::new()),
            }
        };

        let task = tokio::spawn(async move { ingest.run(source, stop_rx).await });

        let result = rx.recv().await.unwrap();
        assert_eq!(result.decision, Decision::Accepted);

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_payloads_are_skipped() {
        let (tx, mut rx) = channel::bounded(16);
        let (stop_tx, stop_rx) = watch::channel(false);
        let ingest = StreamIngest::new(classifier(), tx);

        let mut batches = vec![vec!["not-a-number".to_string(), "42".to_string()]].into_iter();
        let source = move || -> crate::Result<Vec<String>> { Ok(batches.next().unwrap_or_default()) };

        let task = tokio::spawn(async move { ingest.run(source, stop_rx).await });

        // Only the parseable payload comes through.
        assert_eq!(rx.recv().await.unwrap().identifier.value(), 42);

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_channel_teardown_is_fatal() {
        let (tx, rx) = channel::bounded(1);
        let (_stop_tx, stop_rx) = watch::channel(false);
        let ingest = StreamIngest::new(classifier(), tx);
        drop(rx);

        let source = || -> crate::Result<Vec<String>> { Ok(vec!["42".to_string()]) };
        let err = ingest.run(source, stop_rx).await.unwrap_err();
        assert!(matches!(err, Error::ChannelClosed(_)));
    }

    #[tokio::test]
    async fn test_stop_before_first_poll() {
        let (tx, _rx) = channel::bounded(1);
        let (stop_tx, stop_rx) = watch::channel(false);
        stop_tx.send(true).unwrap();

        let ingest = StreamIngest::new(classifier(), tx);
        let source = || -> crate::Result<Vec<String>> { Ok(vec!["42".to_string()]) };
        ingest.run(source, stop_rx).await.unwrap();
    }
}
