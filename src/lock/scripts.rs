//! Lua scripts executed by the lock.
//!
//! Both scripts take the derived lock key as `KEYS[1]`. Arguments are sent as
//! strings, so the token is compared in its decimal form.

use crate::store::Script;

/// Name of the acquire script.
pub const ACQUIRE_NAME: &str = "acquire";

/// Name of the release script.
pub const RELEASE_NAME: &str = "release";

/// Set `KEYS[1]` to `ARGV[1]` with a `ARGV[2]` millisecond expiry, only if
/// the key is absent.
///
/// Replies `OK` when the key was written and `0` when it already existed.
pub const ACQUIRE: Script = Script::new(
    ACQUIRE_NAME,
    r#"
    if redis.call("EXISTS", KEYS[1]) == 1 then
        return 0
    end
    return redis.call("SET", KEYS[1], ARGV[1], "PX", ARGV[2])
    "#,
);

/// Delete `KEYS[1]` only if it still holds `ARGV[1]`.
///
/// Replies with the number of keys removed (`1` or `0`).
pub const RELEASE: Script = Script::new(
    RELEASE_NAME,
    r#"
    if redis.call("GET", KEYS[1]) == ARGV[1] then
        return redis.call("DEL", KEYS[1])
    else
        return 0
    end
    "#,
);
