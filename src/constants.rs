//! Global constants used throughout the redislock codebase.
//!
//! Default lock timings, key naming and retry parameters live here so that
//! the lock handle, the configuration layer and the CLI agree on them.

use std::time::Duration;

/// Default time-to-live written to the store for a lock record (10 seconds).
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(10);

/// Default allowance for network latency and clock drift (2 seconds).
///
/// Every store call is bounded by twice this value, and the allowance is
/// added to the expiration when judging whether a fresh acquisition is still
/// usable.
pub const DEFAULT_DRIFT: Duration = Duration::from_secs(2);

/// Suffix appended to a resource name to form its remote key.
///
/// Anything else that touches the same store relies on this naming, so it
/// must not change.
pub const LOCK_KEY_SUFFIX: &str = "-lock";

/// Default Redis port used when an endpoint omits one.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Number of connections in the store pool unless configured otherwise.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "REDISLOCK_CONFIG";

/// Maximum backoff delay between `run --wait` acquisition attempts (500ms).
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Starting delay for exponential backoff (10ms).
///
/// Doubles on each retry attempt until [`MAX_BACKOFF_DELAY_MS`] is reached.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// How often the in-memory store drops expired records during normal calls.
pub const MEMORY_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
