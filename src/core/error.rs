//! Error types for redislock.
//!
//! The locking protocol has a deliberately small, closed result space. Every
//! call to [`Locker::lock`](crate::lock::Locker::lock) or
//! [`Locker::unlock`](crate::lock::Locker::unlock) yields exactly one of:
//!
//! - `Ok(())`
//! - [`LockError::Taken`] - another holder owns the resource, or the usable
//!   window of this attempt collapsed under latency. Retryable.
//! - [`LockError::Released`] - the stored token no longer matches ours.
//!   Retrying is meaningless.
//! - [`LockError::Store`] - the key store call itself failed. The original
//!   [`StoreError`] is carried unchanged and never classified further.
//!
//! Configuration problems are reported through [`ConfigError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use redislock::core::LockError;
//! use redislock::lock::{Locker, StoreLock};
//! use redislock::store::MemoryStore;
//!
//! # async fn example() -> Result<(), LockError> {
//! let lock = StoreLock::new(MemoryStore::new());
//! match lock.lock("reports").await {
//!     Ok(()) => println!("acquired"),
//!     Err(e) if e.is_retryable() => println!("busy, try later"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;
use thiserror::Error;

/// Outcome of a failed lock or unlock call.
#[derive(Error, Debug)]
pub enum LockError {
    /// The resource is held by someone else, or the acquisition came back too
    /// close to its expiry to be trusted.
    #[error("lock has been taken")]
    Taken,

    /// The remote record does not carry our token: it expired, was never
    /// ours, or was already released.
    #[error("lock has been released")]
    Released,

    /// The key store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LockError {
    /// Whether trying the same operation again later can succeed.
    ///
    /// Only contention is retryable. Store failures are left for the caller
    /// to judge, so they report `false` here.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Taken)
    }

    /// Returns the underlying store error, if any.
    #[must_use]
    pub const fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure reported by a [`KeyStore`](crate::store::KeyStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The call did not complete before its deadline.
    #[error("key store call timed out after {after:?}")]
    Timeout {
        /// The time budget the call was given
        after: Duration,
    },

    /// Error raised by the Redis client.
    #[error(transparent)]
    Backend(#[from] fred::error::Error),

    /// The script ran but answered with something it never returns.
    #[error("unexpected reply from script '{script}': {reply}")]
    UnexpectedReply {
        /// Name of the script that was executed
        script: &'static str,
        /// Debug rendering of the reply
        reply: String,
    },

    /// The script was rejected or raised an error inside the store.
    #[error("script '{script}' failed: {message}")]
    Script {
        /// Name of the script that failed
        script: &'static str,
        /// Error text reported by the store
        message: String,
    },

    /// The store does not know how to execute the given script.
    #[error("script '{0}' is not supported by this store")]
    UnsupportedScript(&'static str),

    /// The store could not serve the request.
    #[error("key store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether this error is a deadline expiry.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Lock expiration must be positive.
    #[error("lock expiration must be greater than zero")]
    ZeroExpiration,

    /// Drift allowance must be positive; it bounds every store call.
    #[error("drift allowance must be greater than zero")]
    ZeroDrift,

    /// The store endpoint is empty.
    #[error("store endpoint is empty")]
    EmptyEndpoint,

    /// The endpoint port is not a valid number.
    #[error("invalid port in endpoint: {0}")]
    InvalidPort(String),

    /// Connection pool must hold at least one connection.
    #[error("store pool size must be at least 1")]
    ZeroPoolSize,
}
