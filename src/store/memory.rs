//! In-process key store.
//!
//! [`MemoryStore`] executes the lock scripts natively instead of running Lua.
//! Each script touches a single key through a [`DashMap`] entry, which holds
//! the shard lock for the whole check-and-write, so two scripts on the same
//! key can never interleave. Records carry a deadline and behave as expired
//! once it has passed, the same way a Redis `PX` expiry does. Expired
//! records are also dropped by a sweep that runs at most once per
//! [`MEMORY_SWEEP_INTERVAL`] from inside regular calls.
//!
//! Clones share state, so every lock handle built from a clone of one store
//! competes for the same keys. The store also supports injected latency and
//! injected outages, which makes it the backend of choice for tests.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use super::{KeyStore, Script, ScriptReply};
use crate::constants::MEMORY_SWEEP_INTERVAL;
use crate::core::StoreError;
use crate::lock::scripts::{ACQUIRE_NAME, RELEASE_NAME};

#[derive(Debug, Clone)]
struct Record {
    value: String,
    expires_at: Instant,
}

impl Record {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Shared in-memory key store with TTL semantics.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Arc<DashMap<String, Record>>,
    latency_ms: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
    epoch: Instant,
    // Milliseconds after `epoch` at which the next sweep is due.
    next_sweep_ms: Arc<AtomicU64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            records: Arc::default(),
            latency_ms: Arc::default(),
            unavailable: Arc::default(),
            epoch: Instant::now(),
            next_sweep_ms: Arc::new(AtomicU64::new(MEMORY_SWEEP_INTERVAL.as_millis() as u64)),
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before the script runs.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    /// Change the injected latency for subsequent calls.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make every call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current live value stored at `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.records
            .get(key)
            .filter(|record| record.is_live(now))
            .map(|record| record.value.clone())
    }

    /// Remaining time to live of `key`, if it exists.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.records
            .get(key)
            .filter(|record| record.is_live(now))
            .map(|record| record.expires_at - now)
    }

    /// Write `key` unconditionally, like a plain `SET key value PX ttl`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        self.records.insert(
            key.into(),
            Record {
                value: value.into(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.records.iter().filter(|entry| entry.is_live(now)).count()
    }

    /// Whether the store holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records held, including expired ones not yet swept.
    pub fn stored_len(&self) -> usize {
        self.records.len()
    }

    /// Drop records whose expiry has passed and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.records.len();
        self.records.retain(|_, record| record.is_live(now));
        before - self.records.len()
    }

    fn sweep_if_due(&self) {
        let elapsed = Instant::now().saturating_duration_since(self.epoch).as_millis() as u64;
        let due = self.next_sweep_ms.load(Ordering::SeqCst);
        if elapsed < due {
            return;
        }

        let next = elapsed + MEMORY_SWEEP_INTERVAL.as_millis() as u64;
        if self
            .next_sweep_ms
            .compare_exchange(due, next, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.purge_expired();
        }
    }

    fn acquire(&self, key: &str, args: &[String]) -> Result<ScriptReply, StoreError> {
        let (token, ttl_ms) = match args {
            [token, ttl_ms, ..] => (token, ttl_ms),
            _ => return Err(wrong_arity(ACQUIRE_NAME)),
        };
        let ttl_ms: u64 = ttl_ms.parse().map_err(|_| StoreError::Script {
            script: ACQUIRE_NAME,
            message: "ERR value is not an integer or out of range".to_string(),
        })?;
        if ttl_ms == 0 {
            return Err(StoreError::Script {
                script: ACQUIRE_NAME,
                message: "ERR invalid expire time in 'set' command".to_string(),
            });
        }

        let now = Instant::now();
        let record = Record {
            value: token.clone(),
            expires_at: now + Duration::from_millis(ttl_ms),
        };

        match self.records.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(ScriptReply::Int(0));
                }
                occupied.insert(record);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record);
            }
        }
        Ok(ScriptReply::Status("OK".to_string()))
    }

    fn release(&self, key: &str, args: &[String]) -> Result<ScriptReply, StoreError> {
        let Some(token) = args.first() else {
            return Err(wrong_arity(RELEASE_NAME));
        };

        let now = Instant::now();
        let removed = self
            .records
            .remove_if(key, |_, record| record.is_live(now) && &record.value == token);
        Ok(ScriptReply::Int(i64::from(removed.is_some())))
    }
}

fn wrong_arity(script: &'static str) -> StoreError {
    StoreError::Script {
        script,
        message: "ERR wrong number of arguments".to_string(),
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn eval(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<ScriptReply, StoreError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unavailable".to_string()));
        }

        self.sweep_if_due();

        let Some(key) = keys.first() else {
            return Err(wrong_arity(script.name()));
        };

        match script.name() {
            ACQUIRE_NAME => self.acquire(key, args),
            RELEASE_NAME => self.release(key, args),
            other => Err(StoreError::UnsupportedScript(other)),
        }
    }
}
