//! Test utilities for redislock
//!
//! Helpers shared by unit and integration tests: one-time logging setup and
//! builders for groups of lock handles competing over one in-memory store.
//!
//! # Example
//!
//! ```rust,no_run
//! use redislock::lock::Locker;
//! use redislock::test_utils::contenders;
//!
//! # async fn example() {
//! let (store, handles) = contenders(2);
//! handles[0].lock("res").await.unwrap();
//! assert!(handles[1].lock("res").await.is_err());
//! assert!(store.get("res-lock").is_some());
//! # }
//! ```

use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::lock::StoreLock;
use crate::store::MemoryStore;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG` if set, otherwise leaves logging off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// `count` lock handles with default timings sharing one fresh store.
pub fn contenders(count: usize) -> (MemoryStore, Vec<Arc<StoreLock<MemoryStore>>>) {
    contenders_with(count, crate::constants::DEFAULT_EXPIRATION, crate::constants::DEFAULT_DRIFT)
}

/// `count` lock handles with the given timings sharing one fresh store.
pub fn contenders_with(
    count: usize,
    expiration: Duration,
    drift: Duration,
) -> (MemoryStore, Vec<Arc<StoreLock<MemoryStore>>>) {
    let store = MemoryStore::new();
    let handles = (0..count)
        .map(|_| {
            Arc::new(
                StoreLock::new(store.clone())
                    .with_expiration(expiration)
                    .with_drift(drift),
            )
        })
        .collect();
    (store, handles)
}
