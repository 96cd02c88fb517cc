//! Distributed mutual exclusion on top of a shared key store.
//!
//! A [`StoreLock`] coordinates independent processes through one remote
//! record per resource. The record lives at `"<resource>-lock"`, holds the
//! random ownership token of whoever acquired it, and carries a store-side
//! expiry equal to the lock's expiration. Safety comes entirely from the
//! store running each script atomically; no client-side coordination is
//! involved, and any number of handles may share one store connection.
//!
//! # Protocol
//!
//! **Acquire** generates a fresh token and runs [`scripts::ACQUIRE`]: set the
//! key with a millisecond expiry only if it does not exist. The call is
//! bounded by twice the drift allowance. When the write succeeds the lock
//! still checks how much of its validity window survived the round trip;
//! if `expiration + drift - elapsed` is not positive the acquisition is
//! reported as [`LockError::Taken`]. On success the token is published into
//! the handle.
//!
//! **Release** reads the published token under shared access and runs
//! [`scripts::RELEASE`]: delete the key only if it still holds that token.
//! Zero keys removed means the lock already expired, was never ours, or was
//! released before, and is reported as [`LockError::Released`].
//!
//! Nothing is retried here and nothing is logged. Every failure goes back to
//! the caller as [`LockError::Taken`], [`LockError::Released`] or the
//! unmodified [`StoreError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use redislock::lock::{Locker, StoreLock};
//! use redislock::store::MemoryStore;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let lock = StoreLock::new(MemoryStore::new())
//!     .with_expiration(Duration::from_secs(30))
//!     .with_drift(Duration::from_secs(1));
//!
//! lock.lock("nightly-report").await?;
//! // critical section
//! lock.unlock("nightly-report").await?;
//! # Ok(())
//! # }
//! ```

pub mod scripts;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::LockConfig;
use crate::constants::{DEFAULT_DRIFT, DEFAULT_EXPIRATION, LOCK_KEY_SUFFIX};
use crate::core::{LockError, StoreError};
use crate::store::{KeyStore, Script, ScriptReply};

/// Something that can lock and unlock named resources.
#[async_trait]
pub trait Locker: Send + Sync {
    /// Try once to acquire `resource`.
    ///
    /// # Errors
    ///
    /// [`LockError::Taken`] if it is held elsewhere or the acquisition came
    /// back too late to be trusted, [`LockError::Store`] if the store failed.
    async fn lock(&self, resource: &str) -> Result<(), LockError>;

    /// Release `resource` if this handle still owns it.
    ///
    /// # Errors
    ///
    /// [`LockError::Released`] if the stored token is not ours,
    /// [`LockError::Store`] if the store failed.
    async fn unlock(&self, resource: &str) -> Result<(), LockError>;
}

/// Remote key for a resource name.
pub fn lock_key(resource: &str) -> String {
    format!("{resource}{LOCK_KEY_SUFFIX}")
}

/// Random ownership token written as the value of a lock record.
///
/// Tokens are non-negative 32-bit integers sent to the store in decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(i32);

impl Token {
    /// A fresh random token, independent of any previous one.
    pub fn generate() -> Self {
        Self(rand::random_range(0..=i32::MAX))
    }

    /// Wrap a known token value.
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// The raw token value.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lock handle backed by a [`KeyStore`].
///
/// One handle is built per logical lock manager and reused for any number of
/// resources and lock/unlock cycles. The handle remembers the token of its
/// last successful acquisition; that token has no meaning once the remote
/// record expired or was taken over.
pub struct StoreLock<S> {
    store: S,
    expiration: Duration,
    drift: Duration,
    token: RwLock<Option<Token>>,
}

impl<S: KeyStore> StoreLock<S> {
    /// Create a handle with the default expiration (10s) and drift (2s).
    pub fn new(store: S) -> Self {
        Self {
            store,
            expiration: DEFAULT_EXPIRATION,
            drift: DEFAULT_DRIFT,
            token: RwLock::new(None),
        }
    }

    /// Create a handle using the timings from `config`.
    pub fn from_config(store: S, config: &LockConfig) -> Self {
        Self::new(store)
            .with_expiration(config.expiration())
            .with_drift(config.drift())
    }

    /// Override the lock TTL.
    #[must_use]
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Override the drift allowance.
    #[must_use]
    pub fn with_drift(mut self, drift: Duration) -> Self {
        self.drift = drift;
        self
    }

    /// Lock TTL written to the store.
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Drift allowance.
    pub fn drift(&self) -> Duration {
        self.drift
    }

    /// The store this handle talks to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Token of the last successful acquisition, if any.
    pub async fn token(&self) -> Option<Token> {
        *self.token.read().await
    }

    /// [`Locker::lock`] with a caller deadline.
    ///
    /// The store call is bounded by the earlier of `deadline` and twice the
    /// drift allowance from now.
    pub async fn lock_until(&self, resource: &str, deadline: Instant) -> Result<(), LockError> {
        self.acquire(resource, Some(deadline)).await
    }

    /// [`Locker::unlock`] with a caller deadline.
    pub async fn unlock_until(&self, resource: &str, deadline: Instant) -> Result<(), LockError> {
        self.release(resource, Some(deadline)).await
    }

    async fn acquire(&self, resource: &str, deadline: Option<Instant>) -> Result<(), LockError> {
        let key = lock_key(resource);
        let token = Token::generate();
        let start = Instant::now();
        let deadline = self.call_deadline(start, deadline);

        let args = [token.to_string(), self.expiration_ms().to_string()];
        let reply = self
            .eval_until(start, deadline, &scripts::ACQUIRE, key, &args)
            .await?;

        let written = match reply {
            ref reply if reply.is_ok_status() => true,
            ScriptReply::Int(0) | ScriptReply::Nil => false,
            other => {
                return Err(StoreError::UnexpectedReply {
                    script: scripts::ACQUIRE.name(),
                    reply: other.to_string(),
                }
                .into());
            }
        };

        // A written record that outlived its validity window is left to expire.
        if !written || self.expiration + self.drift <= start.elapsed() {
            return Err(LockError::Taken);
        }

        *self.token.write().await = Some(token);
        Ok(())
    }

    async fn release(&self, resource: &str, deadline: Option<Instant>) -> Result<(), LockError> {
        let key = lock_key(resource);
        let start = Instant::now();
        let deadline = self.call_deadline(start, deadline);

        // Held for the whole round trip so an acquire cannot publish mid-release.
        let current = self.token.read().await;
        let Some(token) = *current else {
            return Err(LockError::Released);
        };

        let reply = self
            .eval_until(start, deadline, &scripts::RELEASE, key, &[token.to_string()])
            .await?;
        drop(current);

        match reply {
            ScriptReply::Int(0) | ScriptReply::Nil => Err(LockError::Released),
            ScriptReply::Int(_) => Ok(()),
            other => Err(StoreError::UnexpectedReply {
                script: scripts::RELEASE.name(),
                reply: other.to_string(),
            }
            .into()),
        }
    }

    /// Expiration in whole milliseconds, rounded up and never zero.
    fn expiration_ms(&self) -> u128 {
        self.expiration.as_nanos().div_ceil(1_000_000).max(1)
    }

    fn call_deadline(&self, start: Instant, caller: Option<Instant>) -> Instant {
        let own = start + self.drift * 2;
        match caller {
            Some(caller) => caller.min(own),
            None => own,
        }
    }

    async fn eval_until(
        &self,
        start: Instant,
        deadline: Instant,
        script: &Script,
        key: String,
        args: &[String],
    ) -> Result<ScriptReply, StoreError> {
        let keys = [key];
        tokio::time::timeout_at(deadline, self.store.eval(script, &keys, args))
            .await
            .map_err(|_| StoreError::Timeout {
                after: deadline.saturating_duration_since(start),
            })?
    }
}

#[async_trait]
impl<S: KeyStore> Locker for StoreLock<S> {
    async fn lock(&self, resource: &str) -> Result<(), LockError> {
        self.acquire(resource, None).await
    }

    async fn unlock(&self, resource: &str) -> Result<(), LockError> {
        self.release(resource, None).await
    }
}

impl<S> fmt::Debug for StoreLock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreLock")
            .field("expiration", &self.expiration)
            .field("drift", &self.drift)
            .finish_non_exhaustive()
    }
}
