//! # Scanledger
//!
//! Scan-event dedup and lookup engine for identifier check-in pipelines.
//!
//! Scanledger takes identifiers decoded from QR codes (or typed in
//! manually), suppresses repeats within a cooldown window, checks accepted
//! identifiers against a reference set, and hands classified results to a
//! single consumer over a bounded channel.
//!
//! ## Architecture
//!
//! - Reference set: immutable integer membership set, replaced wholesale
//!   via atomic publish
//! - Dedup ledger: per-identifier last-accepted timestamps behind one lock
//! - Classifier: parse, accept-or-suppress, then membership lookup
//! - Event channel: bounded MPSC hand-off to exactly one consumer
//! - Ingest adapters: continuous stream and one-shot manual entry
//!
//! ## Example
//!
//! ```rust,ignore
//! use scanledger::{ClassifierService, DedupLedger, ReferenceHandle};
//! use std::sync::Arc;
//!
//! let classifier = ClassifierService::new(
//!     Arc::new(DedupLedger::default()),
//!     Arc::new(ReferenceHandle::new()),
//! );
//! let result = classifier.classify("42", chrono::Utc::now())?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod channel;
pub mod config;
pub mod ingest;
pub mod ledger;
pub mod models;
pub mod observability;
pub mod reference;
pub mod services;
pub mod sink;

// Re-exports for convenience
pub use channel::{ClassificationReceiver, ClassificationSender, bounded};
pub use config::ScanConfig;
pub use ingest::{FrameSource, ManualEntry, StreamIngest};
pub use ledger::{DEFAULT_COOLDOWN_SECS, DedupLedger};
pub use models::{Classification, Decision, Identifier, MatchOutcome};
pub use reference::{ReferenceHandle, ReferenceSet, load_reference_csv};
pub use services::ClassifierService;
pub use sink::{NotificationCue, SessionLog, render_message};

/// Error type for scanledger operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty or non-numeric raw identifier |
/// | `Format` | Malformed reference dataset at load time |
/// | `IoTransient` | A single capture/decode poll failed; caller retries next cycle |
/// | `ChannelClosed` | Consumer gone while a producer held a pending result |
/// | `OperationFailed` | Config/file I/O failures outside the scan path |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid raw identifier input.
    ///
    /// Raised when:
    /// - The submitted payload is empty or whitespace-only
    /// - The payload does not parse as an integer
    ///
    /// Per-event and local: one bad identifier never stops the stream, and
    /// the ledger is left untouched.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed reference dataset.
    ///
    /// Raised when:
    /// - The key column index is out of range for a record
    /// - A key cell is non-numeric
    /// - The file cannot be read as tabular data
    ///
    /// The pipeline stays usable without an active reference set; lookups
    /// degrade to "not found" until a valid set is published.
    #[error("reference data format error: {0}")]
    Format(String),

    /// Transient capture/decode failure for a single poll cycle.
    ///
    /// Never fatal: the stream adapter logs it and continues with the next
    /// cycle.
    #[error("transient source error: {0}")]
    IoTransient(String),

    /// The result channel was torn down while a producer still held a
    /// pending classification.
    ///
    /// Fatal to that producer's loop; propagated for orderly shutdown.
    #[error("result channel closed: {0}")]
    ChannelClosed(String),

    /// An operation outside the scan path failed.
    ///
    /// Raised when:
    /// - Configuration file cannot be read or parsed
    /// - Filesystem I/O errors occur around the reference loader
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for scanledger operations.
pub type Result<T> = std::result::Result<T, Error>;
