//! Identifier parsing and representation.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized integer key derived from a scanned or manually entered payload.
///
/// Construction goes through [`Identifier::parse`] (or `FromStr`), which is
/// the only place raw text is coerced: non-numeric input is a typed
/// [`Error::InvalidInput`], never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(i64);

impl Identifier {
    /// Creates an identifier from a known-good integer value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Parses raw payload text into an identifier.
    ///
    /// Leading and trailing whitespace is ignored, matching how scanned
    /// payloads arrive from decoders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the trimmed payload is empty or
    /// does not parse as a base-10 integer.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("empty identifier".to_string()));
        }
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::InvalidInput(format!("not a numeric identifier: '{trimmed}'")))
    }

    /// Returns the underlying integer value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
