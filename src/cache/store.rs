use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cache::{cache_key, CachedForecast, ResultCache};
use crate::types::InputWindow;

/// Probe the backing store once and pick the cache capability for the life
/// of the process: the real client if the store answers, otherwise a no-op
/// client. An unreachable store costs throughput, never correctness.
pub async fn connect(url: &str, ttl_secs: u64) -> Arc<dyn ResultCache> {
    match RedisCache::connect(url, ttl_secs).await {
        Ok(cache) => {
            info!("✅ Redis connected at {}", url);
            Arc::new(cache)
        }
        Err(e) => {
            warn!("⚠️ Redis connection failed ({:#}). Caching disabled.", e);
            Arc::new(NoopCache)
        }
    }
}

/// Redis-backed result cache. Entries are JSON values written with a
/// per-entry TTL; expiry is Redis's job, there is no sweeper here.
pub struct RedisCache {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisCache {
    pub async fn connect(url: &str, ttl_secs: u64) -> Result<Self> {
        let client = redis::Client::open(url).context("Invalid Redis URL")?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to establish Redis connection")?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .context("Redis ping failed")?;
        Ok(Self { conn, ttl_secs })
    }
}

#[async_trait]
impl ResultCache for RedisCache {
    async fn lookup(&self, symbol: &str, window: &InputWindow) -> Option<CachedForecast> {
        let key = cache_key(symbol, window);
        let mut conn = self.conn.clone();

        let raw: Option<String> = match redis::cmd("GET").arg(&key).query_async(&mut conn).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Redis get error: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw?) {
            Ok(entry) => {
                info!("⚡ Cache hit for {}", symbol);
                Some(entry)
            }
            Err(e) => {
                error!("Corrupt cache entry at {}: {}", key, e);
                None
            }
        }
    }

    async fn store(&self, symbol: &str, window: &InputWindow, entry: &CachedForecast) {
        let key = cache_key(symbol, window);
        let json = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize forecast for {}: {}", symbol, e);
                return;
            }
        };

        let mut conn = self.conn.clone();
        if let Err(e) = redis::cmd("SET")
            .arg(&key)
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
        {
            error!("Redis set error: {}", e);
        }
    }

    async fn invalidate(&self, symbol: &str, window: &InputWindow) {
        let key = cache_key(symbol, window);
        let mut conn = self.conn.clone();
        if let Err(e) = redis::cmd("DEL")
            .arg(&key)
            .query_async::<_, ()>(&mut conn)
            .await
        {
            error!("Redis del error: {}", e);
        }
    }
}

/// Cache capability for a deployment with no reachable backing store.
pub struct NoopCache;

#[async_trait]
impl ResultCache for NoopCache {
    async fn lookup(&self, _symbol: &str, _window: &InputWindow) -> Option<CachedForecast> {
        None
    }

    async fn store(&self, _symbol: &str, _window: &InputWindow, _entry: &CachedForecast) {}

    async fn invalidate(&self, _symbol: &str, _window: &InputWindow) {}
}
