use parking_lot::Mutex;

use anyhow::Result;

use super::lru_k::{LrukCache, DEFAULT_FIFO_ENTRIES};
use super::view::ByteView;

/// Thread-safe wrapper around the LRU-K engine.
///
/// A plain mutex rather than a reader/writer lock: even a lookup mutates
/// recency state, so there is no read-only path to share. The lock is never
/// held across I/O or any await point.
pub struct LocalCache {
    inner: Mutex<LrukCache>,
}

impl LocalCache {
    pub fn new(max_bytes: usize) -> Self {
        Self::with_fifo_entries(max_bytes, DEFAULT_FIFO_ENTRIES)
    }

    pub fn with_fifo_entries(max_bytes: usize, fifo_max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(LrukCache::new(max_bytes, fifo_max_entries, None)),
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        self.inner.lock().get(key)
    }

    pub fn add(&self, key: &str, value: ByteView) -> Result<()> {
        self.inner.lock().add(key, value)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.inner.lock().used_bytes()
    }
}
