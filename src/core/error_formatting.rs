//! User-facing error rendering for the `redislock` binary.
//!
//! Turns an [`anyhow::Error`] coming out of a command into an
//! [`ErrorContext`] carrying a short message plus optional details and a
//! suggestion, then prints it with colors.

use colored::Colorize;
use std::fmt;

use super::error::{ConfigError, LockError, StoreError};

/// An error message enriched with details and a suggested fix.
#[derive(Debug)]
pub struct ErrorContext {
    /// Top-level message shown after `error:`
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context holding only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion, displayed in green.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details, displayed in yellow.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Walks the error chain looking for the crate's own error types and attaches
/// a suggestion for the ones a user can act on. Anything else is rendered
/// with its full `anyhow` context chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    for cause in error.chain() {
        if let Some(lock_error) = cause.downcast_ref::<LockError>() {
            return match lock_error {
                LockError::Taken => ErrorContext::new(message)
                    .with_details("Another process currently holds this resource")
                    .with_suggestion("Retry later or pass --wait to keep trying"),
                LockError::Released => ErrorContext::new(message).with_details(
                    "The lock expired or was taken over before it could be released",
                ),
                LockError::Store(store_error) => store_context(message, store_error),
            };
        }

        if let Some(store_error) = cause.downcast_ref::<StoreError>() {
            return store_context(message, store_error);
        }

        if cause.downcast_ref::<ConfigError>().is_some() {
            return ErrorContext::new(message)
                .with_suggestion("Check the [store] and [lock] sections of the config file");
        }
    }

    ErrorContext::new(message)
}

fn store_context(message: String, error: &StoreError) -> ErrorContext {
    match error {
        StoreError::Timeout { .. } => ErrorContext::new(message)
            .with_details("The store did not answer within twice the drift allowance")
            .with_suggestion("Check store latency or raise lock.drift_ms"),
        StoreError::Backend(_) => ErrorContext::new(message)
            .with_suggestion("Check that the Redis endpoint is reachable and credentials are set"),
        _ => ErrorContext::new(message),
    }
}
