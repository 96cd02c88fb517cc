//! redislock - a single-store distributed mutex
//!
//! Independent processes and hosts coordinate access to a named resource
//! through a record in a shared Redis-compatible store. Acquisition and
//! release are each one atomic server-side script, ownership is proven with
//! a random token, and every lock carries a store-enforced expiry so a
//! crashed holder never blocks others for longer than the lock's TTL.
//!
//! # Architecture Overview
//!
//! - [`lock`] - the acquire/release protocol ([`lock::StoreLock`]) and the
//!   [`lock::Locker`] trait callers program against
//! - [`store`] - the [`store::KeyStore`] capability with a Redis backend and
//!   an in-process backend
//! - [`config`] - TOML configuration for the store connection and lock timings
//! - [`core`] - error types and user-facing error rendering
//! - [`cli`] - the `redislock` command-line tool
//!
//! # Guarantees
//!
//! - At most one handle holds a non-expired acquisition of a resource at any
//!   time, as long as the store executes scripts atomically.
//! - A release only deletes the record if it still carries the releasing
//!   handle's token.
//! - Each call performs exactly one store round trip, bounded by twice the
//!   drift allowance.
//!
//! This is a single-store lock: there is no quorum acquisition across
//! independent stores, no reentrancy and no waiter queue. A caller that loses
//! the race gets [`core::LockError::Taken`] and decides for itself whether to
//! retry.
//!
//! # Example
//!
//! ```rust,no_run
//! use redislock::config::Config;
//! use redislock::lock::{Locker, StoreLock};
//! use redislock::store::RedisStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load().await?;
//! let store = RedisStore::connect(&config.store).await?;
//! let lock = StoreLock::from_config(store, &config.lock);
//!
//! lock.lock("invoice-export").await?;
//! // ... exclusive work ...
//! lock.unlock("invoice-export").await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod lock;
pub mod store;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
