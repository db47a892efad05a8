//! Per-key write serialization.
//!
//! Every get-or-create and get-or-increment against the backend is a
//! read-then-write sequence with no atomicity guarantee: two concurrent
//! calls for the same key can both observe "absent" and both create, or
//! both read the same count and both write count+1. The backend offers no
//! compare-and-swap, so the store serializes writers per key instead:
//! each normalized key maps to one async mutex, and the full sequence runs
//! under its guard.
//!
//! This protects a single process. Multiple processes writing the same
//! graph still race; see the store-level documentation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

/// Registry of per-key async mutexes.
///
/// Entries are created on first use and never evicted. The key space is
/// bounded by the distinct vertices and edges the deployment touches,
/// which this domain keeps small.
#[derive(Default)]
pub struct KeyLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the mutex for `key`, waiting if another writer holds it.
    ///
    /// The guard is owned so it can be held across await points.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                map.entry(key.to_string())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        entry.lock_owned().await
    }
}
