//! Engine services.
//!
//! Services combine the ledger and the reference handle into the
//! classification operation the ingest adapters call.

mod classifier;

pub use classifier::ClassifierService;
