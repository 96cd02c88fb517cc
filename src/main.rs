//! redislock CLI entry point
//!
//! Parses arguments, runs the selected command and turns failures into a
//! user-friendly message on stderr.

use clap::Parser;
use redislock::cli;
use redislock::core::user_friendly_error;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
