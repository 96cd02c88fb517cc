//! Key store capability consumed by the lock.
//!
//! The lock never reads or writes keys directly. All it needs from a store is
//! the ability to run a short script atomically against one key, which is
//! what [`KeyStore::eval`] expresses. Two implementations ship with the crate:
//!
//! - [`RedisStore`] - a `fred` connection pool talking to Redis or KeyDB,
//!   where scripts run as server-side Lua.
//! - [`MemoryStore`] - an in-process store giving the same guarantees to
//!   handles that share it, with server-style key expiry.
//!
//! Deadlines are not part of the trait. The caller wraps the returned future
//! in a timeout, and dropping the future abandons the call.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;
use std::fmt;

use crate::core::StoreError;

/// A server-side script: a stable name plus its Lua source.
///
/// The name identifies the script to stores that do not execute Lua and
/// appears in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    name: &'static str,
    body: &'static str,
}

impl Script {
    /// Declare a script.
    #[must_use]
    pub const fn new(name: &'static str, body: &'static str) -> Self {
        Self { name, body }
    }

    /// Stable script name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Lua source of the script.
    #[must_use]
    pub const fn body(&self) -> &'static str {
        self.body
    }
}

/// Decoded reply of a script execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptReply {
    /// Nil / no value
    Nil,
    /// Integer reply
    Int(i64),
    /// Status or bulk string reply, e.g. `OK`
    Status(String),
}

impl ScriptReply {
    /// Whether this is the `OK` status returned by a successful `SET`.
    #[must_use]
    pub fn is_ok_status(&self) -> bool {
        matches!(self, Self::Status(s) if s == "OK")
    }
}

impl fmt::Display for ScriptReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "(nil)"),
            Self::Int(n) => write!(f, "(integer) {n}"),
            Self::Status(s) => write!(f, "{s:?}"),
        }
    }
}

/// Atomic script execution against a shared key-value store.
///
/// Implementations must run `script` as one indivisible unit relative to
/// every other operation on the same key. They are shared between lock
/// handles and tasks, so they take `&self` and must be `Send + Sync`.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Execute `script` with the given keys and string arguments.
    async fn eval(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<ScriptReply, StoreError>;
}

#[async_trait]
impl<S: KeyStore + ?Sized> KeyStore for std::sync::Arc<S> {
    async fn eval(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<ScriptReply, StoreError> {
        (**self).eval(script, keys, args).await
    }
}
