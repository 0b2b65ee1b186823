//! Generation Cache - Content-Addressed Memo over a Generation Backend
//!
//! **Keying:**
//! The key is the hex SHA-256 of the exact prompt bytes. Nothing about the
//! caller goes into it, so byte-identical prompts always share an entry.
//!
//! **Eviction:**
//! Insertion-order FIFO bounded to `capacity` entries. Hits do not refresh an
//! entry's position. A capacity of 0 disables storage.
//!
//! **Concurrency:**
//! Entries live behind a mutex that is never held across an await. Concurrent
//! misses for the same key are coalesced: one caller runs the backend, the rest
//! wait on a per-key lock and then read the stored value. Failures are never
//! stored; the next waiter tries the backend itself.

use crate::generator::{validate_prompt, GenerationBackend};
use judgeline_common::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Content key for a prompt.
pub fn cache_key(prompt: &str) -> String {
    format!("{:x}", Sha256::digest(prompt.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

#[derive(Default)]
struct FifoStore {
    values: HashMap<String, String>,
    order: VecDeque<String>,
}

impl FifoStore {
    fn insert(&mut self, key: String, value: String, capacity: usize) {
        if let Some(existing) = self.values.get_mut(&key) {
            *existing = value;
            return;
        }
        while self.order.len() >= capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.values.remove(&oldest);
                    debug!(key = %oldest, "Evicted cache entry");
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.values.insert(key, value);
    }
}

type FlightLock = Arc<tokio::sync::Mutex<()>>;

pub struct GenerationCache {
    backend: Arc<dyn GenerationBackend>,
    capacity: usize,
    store: Mutex<FifoStore>,
    in_flight: Mutex<HashMap<String, FlightLock>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GenerationCache {
    pub fn new(backend: Arc<dyn GenerationBackend>, capacity: usize) -> Self {
        Self {
            backend,
            capacity,
            store: Mutex::new(FifoStore::default()),
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Uncached passthrough to the backend.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.backend.generate(prompt).await
    }

    /// Return the stored result for `prompt`, or generate and store it.
    pub async fn cached_generate(&self, prompt: &str) -> Result<String> {
        validate_prompt(prompt)?;
        let key = cache_key(prompt);

        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        if self.capacity == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return self.backend.generate(prompt).await;
        }

        let flight = InFlight::join(self, &key);
        let _turn = flight.turn().await;

        // Another caller may have filled the entry while we waited
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Generation cache miss");

        let result = self.backend.generate(prompt).await;
        if let Ok(ref text) = result {
            self.lock_store().insert(key.clone(), text.clone(), self.capacity);
        }
        result
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.lock_store().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.lock_store().values.contains_key(&cache_key(prompt))
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let value = self.lock_store().values.get(key).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Generation cache hit");
        }
        value
    }

    fn lock_store(&self) -> MutexGuard<'_, FifoStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, FlightLock>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A caller's membership in the per-key flight.
///
/// Dropping it, on any exit path including cancellation, removes the key's
/// lock once no other caller holds it.
struct InFlight<'a> {
    cache: &'a GenerationCache,
    key: &'a str,
    lock: Option<FlightLock>,
}

impl<'a> InFlight<'a> {
    fn join(cache: &'a GenerationCache, key: &'a str) -> Self {
        let lock = cache.lock_in_flight().entry(key.to_string()).or_default().clone();
        Self {
            cache,
            key,
            lock: Some(lock),
        }
    }

    async fn turn(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.cache.lock_in_flight();
        // Release our handle under the map lock so the last member sees a count of 1
        drop(self.lock.take());
        if in_flight
            .get(self.key)
            .is_some_and(|current| Arc::strong_count(current) == 1)
        {
            in_flight.remove(self.key);
        }
    }
}
