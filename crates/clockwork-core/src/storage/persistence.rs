//! Store wrapper shared by every engine.
//!
//! A failing store must never stop an engine. The first failed read or write
//! flips the session into memory-only mode: it is logged once and later
//! writes are skipped, so a record that could not be read is never
//! overwritten with a default. Malformed records fall back to the caller's
//! default without degrading.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{KvStore, MemoryStore};

pub struct Persistence {
    store: Arc<dyn KvStore>,
    degraded: AtomicBool,
}

impl Persistence {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            degraded: AtomicBool::new(false),
        }
    }

    /// Persistence over a fresh [`MemoryStore`].
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// `true` once a read or write has failed and the session is memory-only.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "store read failed, continuing memory-only");
                self.degraded.store(true, Ordering::SeqCst);
                None
            }
        }
    }

    /// Load and decode a JSON record. Absent, unreadable or malformed records
    /// yield `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "malformed stored record, using default");
                None
            }
        }
    }

    pub fn save_raw(&self, key: &str, value: &str) {
        if self.is_degraded() {
            return;
        }
        match self.store.set(key, value) {
            Ok(()) => debug!(key, bytes = value.len(), "persisted"),
            Err(e) => {
                warn!(key, error = %e, "store unavailable, continuing memory-only");
                self.degraded.store(true, Ordering::SeqCst);
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.save_raw(key, &json),
            Err(e) => warn!(key, error = %e, "failed to encode record"),
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("degraded", &self.is_degraded())
            .finish_non_exhaustive()
    }
}
