//! Bounded result channel.
//!
//! Ordered hand-off of classifications from any number of producers to
//! exactly one consumer. Built on `tokio::sync::mpsc`: sends await under
//! backpressure rather than dropping (a silently dropped classification is
//! a correctness violation for this domain), and delivery order is the
//! order sends complete at the channel.

use crate::models::Classification;
use crate::{Error, Result};
use tokio::sync::mpsc;

/// Default bounded capacity for the result channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Producer half of the result channel. Cheap to clone, one per producer.
#[derive(Clone)]
pub struct ClassificationSender {
    inner: mpsc::Sender<Classification>,
}

/// Consumer half of the result channel. Exactly one exists.
pub struct ClassificationReceiver {
    inner: mpsc::Receiver<Classification>,
}

/// Creates a bounded result channel.
#[must_use]
pub fn bounded(capacity: usize) -> (ClassificationSender, ClassificationReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        ClassificationSender { inner: tx },
        ClassificationReceiver { inner: rx },
    )
}

impl ClassificationSender {
    /// Delivers a classification to the consumer.
    ///
    /// Waits when the buffer is full; returns once the channel has taken
    /// ownership, after which the message cannot be lost or duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the consumer has been torn down.
    /// This is fatal to the calling producer loop.
    pub async fn send(&self, classification: Classification) -> Result<()> {
        metrics::counter!("result_channel_send_total").increment(1);
        self.inner
            .send(classification)
            .await
            .map_err(|e| Error::ChannelClosed(format!("pending result for id {}", e.0.identifier)))
    }

    /// Delivers a classification from synchronous (non-async) code.
    ///
    /// Blocks the calling thread under backpressure. Must not be called
    /// from within an async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the consumer has been torn down.
    pub fn blocking_send(&self, classification: Classification) -> Result<()> {
        metrics::counter!("result_channel_send_total").increment(1);
        self.inner
            .blocking_send(classification)
            .map_err(|e| Error::ChannelClosed(format!("pending result for id {}", e.0.identifier)))
    }
}

impl ClassificationReceiver {
    /// Receives the next classification, waiting until one is available.
    ///
    /// Returns `None` once every sender is dropped and the buffer is
    /// drained, which is the orderly end-of-stream signal.
    pub async fn recv(&mut self) -> Option<Classification> {
        self.inner.recv().await
    }

    /// Closes the receiving half.
    ///
    /// Producers observe [`Error::ChannelClosed`] on their next send;
    /// already-buffered results can still be drained with `recv`.
    pub fn close(&mut self) {
        self.inner.close();
    }
}
