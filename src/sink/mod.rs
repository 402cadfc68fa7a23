//! Result sink: rendering, session log, and notification cues.
//!
//! The single consumer drains the result channel, renders human-readable
//! messages, appends accepted results to a per-session log, and triggers a
//! notification cue keyed by match outcome. The cue is best effort: a
//! failing cue is logged and never fails the classification.

use crate::channel::ClassificationReceiver;
use crate::models::{Classification, Decision, MatchOutcome};
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Renders the human-readable message for a classification.
#[must_use]
pub fn render_message(classification: &Classification) -> String {
    let id = classification.identifier;
    match (classification.decision, classification.outcome) {
        (Decision::Suppressed, _) => {
            format!("Duplicate QR code's value {id} (not added due to redundancy).")
        },
        (Decision::Accepted, MatchOutcome::Found) => {
            format!("QR code's value {id} was found in the Excel file.")
        },
        (Decision::Accepted, _) => {
            format!("QR code's value {id} was not found in the Excel file.")
        },
    }
}

/// One accepted scan in the session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLogEntry {
    /// Boundary-format timestamp (`YYYY-MM-DD HH:MM:SS`).
    pub timestamp: String,
    /// The accepted identifier.
    pub identifier: i64,
}

/// Append-only log of accepted scans, keyed by timestamp and identifier.
///
/// Lives for the session only; scan history is not persisted across
/// process restarts.
#[derive(Debug, Default)]
pub struct SessionLog {
    entries: Mutex<Vec<SessionLogEntry>>,
}

impl SessionLog {
    /// Creates an empty session log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an accepted classification. Suppressed events are ignored.
    pub fn append(&self, classification: &Classification) {
        if !classification.is_accepted() {
            return;
        }
        let entry = SessionLogEntry {
            timestamp: classification.boundary_timestamp(),
            identifier: classification.identifier.value(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Returns a copy of the log entries in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<SessionLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of logged scans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Notification cue keyed by match outcome.
///
/// Implementations play a success cue for `Found`, a failure cue for
/// `NotFound`, and nothing for suppressed events. Playback is best effort
/// and must never block the pipeline; implementations report failures via
/// the returned error, which the sink logs and discards.
pub trait NotificationCue: Send + Sync {
    /// Triggers the cue for an outcome.
    ///
    /// # Errors
    ///
    /// Returns an error string if the cue backend failed; the caller logs
    /// it and continues.
    fn play(&self, outcome: MatchOutcome) -> std::result::Result<(), String>;
}

/// Cue that does nothing. Used when cues are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCue;

impl NotificationCue for NoCue {
    fn play(&self, _outcome: MatchOutcome) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Cue that emits a log line instead of audio. The binary's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCue;

impl NotificationCue for TracingCue {
    fn play(&self, outcome: MatchOutcome) -> std::result::Result<(), String> {
        match outcome {
            MatchOutcome::Found => info!(cue = "success", "notification cue"),
            MatchOutcome::NotFound => info!(cue = "failure", "notification cue"),
            MatchOutcome::NotChecked => {},
        }
        Ok(())
    }
}

/// Drains the result channel until every producer is gone.
///
/// For each result: renders the message (handed to `display`), appends
/// accepted results to the session log, and triggers the cue for accepted
/// outcomes. Returns the number of results consumed.
pub async fn run_sink(
    mut receiver: ClassificationReceiver,
    log: &SessionLog,
    cue: &dyn NotificationCue,
    mut display: impl FnMut(&str),
) -> usize {
    let mut consumed = 0;

    while let Some(classification) = receiver.recv().await {
        consumed += 1;
        metrics::counter!("sink_results_total").increment(1);

        let message = render_message(&classification);
        display(&message);
        log.append(&classification);

        if classification.is_accepted() {
            if let Err(cause) = cue.play(classification.outcome) {
                // A broken cue never fails the classification.
                warn!(%cause, "notification cue failed");
            }
        }
    }

    info!(consumed, "result sink drained");
    consumed
}
