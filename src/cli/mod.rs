//! Command-line interface for redislock.
//!
//! The `redislock` binary wraps the lock for shell use:
//!
//! - `run` - hold a lock for the lifetime of a child command
//! - `probe` - report whether a resource is currently free
//!
//! # Global Options
//!
//! - `--verbose` - enable debug logging
//! - `--quiet` - only log errors
//! - `--config` - path to the config file (see [`crate::config`])
//!
//! # Example
//!
//! ```bash
//! # Run a nightly job on at most one host, waiting up to a minute for the lock
//! redislock run nightly-report --wait 60 -- ./generate-report.sh
//!
//! # Check whether anyone holds it right now
//! redislock probe nightly-report
//! ```

mod probe;
mod run;

pub use run::acquire_with_wait;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "redislock",
    about = "Distributed mutex backed by a Redis-compatible store",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to `RUST_LOG=debug`)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true, env = "REDISLOCK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hold a lock while a command runs
    Run(run::RunCommand),

    /// Check whether a resource is currently locked
    Probe(probe::ProbeCommand),
}

impl Cli {
    /// Set up logging, load configuration and run the selected command.
    ///
    /// Returns the process exit code.
    pub async fn execute(self) -> Result<i32> {
        init_logging(self.log_filter());

        let config = Config::load_with_optional(self.config.clone()).await?;
        config.validate()?;

        match self.command {
            Commands::Run(cmd) => cmd.execute(config).await,
            Commands::Probe(cmd) => cmd.execute(config).await,
        }
    }

    /// Log filter chosen by the verbosity flags.
    ///
    /// `RUST_LOG` is honored only when neither flag is given.
    fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        }
    }
}

fn init_logging(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
