//! `redislock run` - hold a lock while a child command runs.
//!
//! The lock is acquired once (or retried with backoff while `--wait` allows),
//! the command is spawned, and the lock is released as soon as the command
//! exits. The exit code of the child becomes the exit code of `redislock`.
//!
//! The lock is not refreshed while the child runs. A command that outlives
//! the configured expiration loses its exclusivity, and the release at the
//! end is then reported as a warning.

use anyhow::{Context, Result};
use clap::Args;
use std::time::Duration;
use tokio::process::Command;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::LockError;
use crate::lock::{Locker, StoreLock};
use crate::store::{KeyStore, RedisStore};

/// Arguments of `redislock run`.
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Name of the resource to lock
    pub(super) resource: String,

    /// Keep retrying a taken lock for up to this many seconds
    #[arg(long, value_name = "SECS")]
    pub(super) wait: Option<u64>,

    /// Lock expiration in milliseconds, overriding the config file
    #[arg(long, value_name = "MS")]
    pub(super) expiration_ms: Option<u64>,

    /// Command to run while the lock is held
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub(super) command: Vec<String>,
}

impl RunCommand {
    /// Connect to the configured store and run the command under the lock.
    pub async fn execute(self, mut config: Config) -> Result<i32> {
        if let Some(expiration_ms) = self.expiration_ms {
            config.lock.expiration_ms = expiration_ms;
            config.validate()?;
        }

        let store = RedisStore::connect(&config.store).await?;
        let lock = StoreLock::from_config(store, &config.lock);
        let code = self.execute_with(&lock).await;

        if let Err(e) = lock.store().quit().await {
            debug!(error = %e, "failed to close store connections");
        }
        code
    }

    /// Run the command while holding `resource` on the given lock.
    pub async fn execute_with<S: KeyStore>(&self, lock: &StoreLock<S>) -> Result<i32> {
        let wait = self.wait.map(Duration::from_secs);
        acquire_with_wait(lock, &self.resource, wait)
            .await
            .with_context(|| format!("failed to acquire lock on '{}'", self.resource))?;
        info!(resource = %self.resource, "lock acquired");

        let (program, args) = self
            .command
            .split_first()
            .context("no command given")?;
        let status = Command::new(program).args(args).status().await;

        match lock.unlock(&self.resource).await {
            Ok(()) => info!(resource = %self.resource, "lock released"),
            Err(LockError::Released) => warn!(
                resource = %self.resource,
                "lock expired or was taken over before the command finished"
            ),
            Err(e) => warn!(resource = %self.resource, error = %e, "failed to release lock"),
        }

        let status = status.with_context(|| format!("failed to run '{program}'"))?;
        debug!(%status, "command finished");
        Ok(status.code().unwrap_or(1))
    }
}

/// Acquire `resource`, retrying contention until `wait` elapses.
///
/// Without `wait` this is a single attempt. Only [`LockError::Taken`] is
/// retried, with capped exponential backoff; store failures end the wait
/// immediately. If the time runs out the result is [`LockError::Taken`].
pub async fn acquire_with_wait<L>(
    lock: &L,
    resource: &str,
    wait: Option<Duration>,
) -> Result<(), LockError>
where
    L: Locker + ?Sized,
{
    let Some(wait) = wait else {
        return lock.lock(resource).await;
    };

    let strategy = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
        .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
        .factor(2);

    let attempts = RetryIf::start(
        strategy,
        || lock.lock(resource),
        |e: &LockError| {
            debug!(%resource, error = %e, "lock attempt failed");
            e.is_retryable()
        },
    );

    match tokio::time::timeout(wait, attempts).await {
        Ok(result) => result,
        Err(_) => Err(LockError::Taken),
    }
}
