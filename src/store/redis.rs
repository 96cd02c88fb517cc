//! Redis / KeyDB backed key store.
//!
//! Builds a [`fred::clients::Pool`] from [`StoreConfig`], optionally enabling
//! TLS via `rustls` and reading the password from an environment variable,
//! and executes lock scripts with `EVAL` so the check and the write happen
//! inside one server-side Lua call.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fred::clients::Pool;
use fred::interfaces::{ClientLike, LuaInterface};
use fred::types::Builder;
use fred::types::Value;
use fred::types::config::{ReconnectPolicy, ServerConfig, TlsConnector};

use super::{KeyStore, Script, ScriptReply};
use crate::config::StoreConfig;
use crate::constants::DEFAULT_REDIS_PORT;
use crate::core::{ConfigError, StoreError};

/// Key store backed by a pool of Redis connections.
///
/// Cloning is cheap and clones share the pool, so any number of lock handles
/// can use the same connections.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Wrap an already initialised pool.
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    /// Connect to the server described by `config`.
    ///
    /// The pool is initialised and verified with a `PING` before being
    /// returned. If `config.tls` is set the connection uses `rustls`.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let password = config
            .password_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok());

        let (host, port) = parse_host_port(&config.endpoint)?;

        let mut fred_config = fred::types::config::Config {
            server: ServerConfig::new_centralized(host, port),
            ..fred::types::config::Config::default()
        };

        if config.tls {
            fred_config.tls = Some(TlsConnector::default_rustls()?.into());
        }

        if let Some(password) = password {
            fred_config.password = Some(password);
        }

        let mut builder = Builder::from_config(fred_config);

        // Exponential reconnect: initial 0ms, base 100ms, max 30s, factor 2.
        builder.set_policy(ReconnectPolicy::new_exponential(0, 100, 30_000, 2));

        let pool = builder
            .build_pool(config.pool_size)
            .context("failed to build Redis connection pool")?;

        pool.init().await.context("failed to connect to Redis")?;

        let _: String = pool.ping(None).await.context("Redis PING failed after connect")?;

        tracing::info!(
            host = host,
            port = port,
            tls = config.tls,
            pool_size = config.pool_size,
            "Redis pool created and verified"
        );

        Ok(Self { pool })
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Close every connection in the pool.
    pub async fn quit(&self) -> Result<()> {
        self.pool.quit().await.context("failed to close Redis pool")
    }
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn eval(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<ScriptReply, StoreError> {
        let value: Value = self.pool.eval(script.body(), keys.to_vec(), args.to_vec()).await?;
        decode_reply(script, value)
    }
}

fn decode_reply(script: &Script, value: Value) -> Result<ScriptReply, StoreError> {
    match value {
        Value::Null => Ok(ScriptReply::Nil),
        Value::Integer(n) => Ok(ScriptReply::Int(n)),
        other => match other.as_string() {
            Some(s) => Ok(ScriptReply::Status(s)),
            None => Err(StoreError::UnexpectedReply {
                script: script.name(),
                reply: format!("{other:?}"),
            }),
        },
    }
}

/// Parse a `host:port` endpoint.
///
/// A leading `redis://` or `rediss://` scheme and any trailing path are
/// stripped. If the port is omitted it defaults to `6379`.
pub fn parse_host_port(endpoint: &str) -> Result<(&str, u16), ConfigError> {
    let endpoint = endpoint
        .trim_start_matches("rediss://")
        .trim_start_matches("redis://");
    let endpoint = endpoint.split('/').next().unwrap_or(endpoint);

    if endpoint.is_empty() {
        return Err(ConfigError::EmptyEndpoint);
    }

    match endpoint.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(endpoint.to_string()))?;
            Ok((host, port))
        }
        None => Ok((endpoint, DEFAULT_REDIS_PORT)),
    }
}
