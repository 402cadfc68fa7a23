//! Ingest adapters.
//!
//! Producers that normalize raw payloads into identifiers and push them
//! through the classifier: a continuous stream adapter (camera/decoder
//! side) and a one-shot manual entry adapter (user side).

mod manual;
mod stream;

pub use manual::ManualEntry;
pub use stream::StreamIngest;

use crate::Result;

/// One polling cycle of a raw identifier source.
///
/// Implementations wrap whatever produces decoded text payloads (a webcam
/// decode loop, a line reader, a test fixture). A cycle may legitimately
/// yield zero payloads; that is not an error. A failed cycle surfaces as
/// [`crate::Error::IoTransient`] and the stream adapter simply continues
/// with the next cycle.
///
/// Implementations must return promptly from each call so the adapter can
/// observe its stop signal between cycles.
pub trait FrameSource: Send {
    /// Polls the source once, returning the payloads decoded this cycle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoTransient`] on a capture/decode hiccup.
    fn poll_decode(&mut self) -> Result<Vec<String>>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Result<Vec<String>> + Send,
{
    fn poll_decode(&mut self) -> Result<Vec<String>> {
        self()
    }
}
