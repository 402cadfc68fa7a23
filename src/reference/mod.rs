//! Reference set storage and publication.
//!
//! The reference set is an immutable membership set over one dataset
//! column. It is built once per load and replaced wholesale; scan activity
//! never mutates it, so readers need no lock on the set itself.

mod loader;

pub use loader::{DEFAULT_KEY_COLUMN, load_reference_csv, load_reference_records};

use crate::models::Identifier;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Immutable integer membership set loaded from one reference column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReferenceSet {
    keys: HashSet<i64>,
}

impl ReferenceSet {
    /// Builds a set from integer keys.
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = i64>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Returns true if the identifier is a member of the set.
    #[must_use]
    pub fn contains(&self, id: Identifier) -> bool {
        self.keys.contains(&id.value())
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the set has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Publication point for the active reference set.
///
/// `publish` swaps the active `Arc` in one assignment; a concurrent reader
/// either still holds the old set or picks up the new one wholly, never a
/// partial view. With no set published, lookups degrade to "not found" so
/// the pipeline stays usable after a failed load.
#[derive(Debug, Default)]
pub struct ReferenceHandle {
    active: RwLock<Option<Arc<ReferenceSet>>>,
}

impl ReferenceHandle {
    /// Creates a handle with no active set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle with an initial active set.
    #[must_use]
    pub fn with_set(set: ReferenceSet) -> Self {
        let handle = Self::new();
        handle.publish(set);
        handle
    }

    /// Atomically replaces the active set.
    pub fn publish(&self, set: ReferenceSet) {
        let size = set.len();
        let mut active = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *active = Some(Arc::new(set));
        drop(active);

        metrics::gauge!("reference_set_size").set(reference_len_f64(size));
        info!(size, "published reference set");
    }

    /// Checks membership against the active set.
    ///
    /// Returns `false` when no set has been published.
    #[must_use]
    pub fn contains(&self, id: Identifier) -> bool {
        self.snapshot().is_some_and(|set| set.contains(id))
    }

    /// Returns the currently active set, if any.
    ///
    /// The returned `Arc` pins one consistent generation of the set for as
    /// long as the caller holds it, independent of later publishes.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<ReferenceSet>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true if a set has been published.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }
}

/// Converts a set size to f64 for metrics, capping at `u32::MAX`.
#[inline]
fn reference_len_f64(len: usize) -> f64 {
    let capped = u32::try_from(len).unwrap_or(u32::MAX);
    f64::from(capped)
}
