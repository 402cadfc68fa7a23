//! Data models for scanledger.
//!
//! This module contains the core value types that flow through the engine.

mod identifier;
mod scan;

pub use identifier::Identifier;
pub use scan::{BOUNDARY_TIMESTAMP_FORMAT, Classification, Decision, MatchOutcome};
