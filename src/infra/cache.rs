//! Redis cache implementation.
//!
//! Backs the menu read-through cache and the request rate limiter.
//! Redis is optional: callers hold an `Option<Arc<Cache>>`.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{CACHE_KEY_MENU, CACHE_PREFIX_RATE_LIMIT, DEFAULT_CACHE_TTL_SECONDS};
use crate::errors::{AppError, AppResult};
use domain::MenuItem;

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl Cache {
    /// Connect to Redis at `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            connection,
            default_ttl: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    /// Connect when a URL is configured, degrading to no cache on failure.
    pub async fn connect_optional(redis_url: Option<&str>) -> Option<Self> {
        let url = redis_url?;
        match Self::connect(url).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, running without cache and rate limiting");
                None
            }
        }
    }

    /// Check connectivity.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with default TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Set a value in cache with custom TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Menu Cache Operations
    // =========================================================================

    /// Get the cached menu listing.
    pub async fn get_menu(&self) -> AppResult<Option<Vec<MenuItem>>> {
        self.get(CACHE_KEY_MENU).await
    }

    /// Cache the full menu listing.
    pub async fn set_menu(&self, items: &[MenuItem]) -> AppResult<()> {
        self.set(CACHE_KEY_MENU, items).await
    }

    /// Drop the cached menu listing after a write.
    pub async fn invalidate_menu(&self) -> AppResult<()> {
        self.delete(CACHE_KEY_MENU).await
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Increment the fixed-window counter for `identifier`.
    /// Returns (current_count, is_allowed) tuple.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        if count == 1 {
            // First request opens the window
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        let count = count.max(0) as u64;
        Ok((count, count <= max_requests))
    }
}

/// Convert Redis error to AppError
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {:?}", e);
    AppError::internal(format!("Cache error: {}", e))
}
