//! Core types shared across redislock.
//!
//! - [`error`] - the lock, store and configuration error enums
//! - [`error_formatting`] - rendering errors for terminal users

pub mod error;
pub mod error_formatting;

pub use error::{ConfigError, LockError, StoreError};
pub use error_formatting::{ErrorContext, user_friendly_error};
