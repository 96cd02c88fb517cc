//! `redislock probe` - check whether a resource is currently locked.
//!
//! Probing takes the lock and immediately releases it. Exit code `0` means
//! the resource was free, `1` means someone else holds it.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::LockError;
use crate::lock::{Locker, StoreLock};
use crate::store::{KeyStore, RedisStore};

/// Whether a probed resource was free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Nobody held the lock
    Free,
    /// Someone else holds the lock
    Held,
}

/// Arguments of `redislock probe`.
#[derive(Args, Debug)]
pub struct ProbeCommand {
    /// Name of the resource to check
    pub(super) resource: String,
}

impl ProbeCommand {
    /// Connect to the configured store and probe the resource.
    pub async fn execute(self, config: Config) -> Result<i32> {
        let store = RedisStore::connect(&config.store).await?;
        let lock = StoreLock::from_config(store, &config.lock);
        let outcome = self.probe(&lock).await?;

        match outcome {
            ProbeOutcome::Free => println!("{} {}", self.resource.bold(), "is free".green()),
            ProbeOutcome::Held => println!("{} {}", self.resource.bold(), "is held".yellow()),
        }

        if let Err(e) = lock.store().quit().await {
            debug!(error = %e, "failed to close store connections");
        }
        Ok(match outcome {
            ProbeOutcome::Free => 0,
            ProbeOutcome::Held => 1,
        })
    }

    /// Take and immediately give back the lock.
    pub async fn probe<S: KeyStore>(&self, lock: &StoreLock<S>) -> Result<ProbeOutcome> {
        match lock.lock(&self.resource).await {
            Ok(()) => {
                if let Err(e) = lock.unlock(&self.resource).await {
                    warn!(resource = %self.resource, error = %e, "failed to release probe lock");
                }
                Ok(ProbeOutcome::Free)
            }
            Err(LockError::Taken) => Ok(ProbeOutcome::Held),
            Err(e) => Err(e.into()),
        }
    }
}
