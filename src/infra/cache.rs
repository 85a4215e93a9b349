//! Redis access.
//!
//! Backs the request rate limiter and the per-customer checkout lock. Neither
//! is load-bearing for correctness: the serializable checkout transaction and
//! the order-item unique index hold even when two checkouts slip past the lock.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, CACHE_PREFIX_LOCK, CACHE_PREFIX_RATE_LIMIT, DEFAULT_LOCK_TTL_SECONDS};
use crate::errors::{AppError, AppResult};

/// Redis wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    /// Check if a key exists.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await.map_err(cache_error)?;
        Ok(exists)
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Check and increment rate limit counter.
    /// Returns (current_count, is_allowed) tuple.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let exists: bool = conn.exists(&key).await.map_err(cache_error)?;

        if !exists {
            let _: () = conn
                .set_ex(&key, 1i64, window_seconds)
                .await
                .map_err(cache_error)?;
            return Ok((1, true));
        }

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        let count = count as u64;

        Ok((count, count <= max_requests))
    }

    // =========================================================================
    // Distributed Lock Operations
    // =========================================================================

    /// Try to acquire a lock without retrying.
    /// Returns None if the lock is already held.
    pub async fn try_acquire_lock(&self, resource: &str) -> AppResult<Option<LockGuard>> {
        let key = format!("{}{}", CACHE_PREFIX_LOCK, resource);
        let lock_id = Uuid::new_v4().to_string();
        let mut conn = self.connection.clone();

        let acquired: bool = redis::cmd("SET")
            .arg(&key)
            .arg(&lock_id)
            .arg("NX")
            .arg("EX")
            .arg(DEFAULT_LOCK_TTL_SECONDS)
            .query_async(&mut conn)
            .await
            .map(|r: Option<String>| r.is_some())
            .map_err(cache_error)?;

        if acquired {
            tracing::debug!(resource = %resource, lock_id = %lock_id, "Lock acquired");
            Ok(Some(LockGuard {
                cache: Arc::new(self.clone()),
                key,
                lock_id,
                released: false,
            }))
        } else {
            tracing::debug!(resource = %resource, "Lock busy");
            Ok(None)
        }
    }

    /// Release a lock only if `lock_id` still owns it.
    async fn release_lock(&self, key: &str, lock_id: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();

        let script = r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#;

        let released: i32 = redis::cmd("EVAL")
            .arg(script)
            .arg(1)
            .arg(key)
            .arg(lock_id)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(released == 1)
    }
}

// =============================================================================
// Lock Guard (RAII)
// =============================================================================

/// RAII guard for distributed locks.
/// Automatically releases the lock when dropped.
pub struct LockGuard {
    cache: Arc<Cache>,
    key: String,
    lock_id: String,
    released: bool,
}

impl LockGuard {
    /// Release the lock before the guard goes out of scope.
    pub async fn release(mut self) -> AppResult<()> {
        self.released = true;
        if self.cache.release_lock(&self.key, &self.lock_id).await? {
            tracing::debug!(key = %self.key, "Lock released");
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            let cache = self.cache.clone();
            let key = self.key.clone();
            let lock_id = self.lock_id.clone();

            tokio::spawn(async move {
                if let Err(e) = cache.release_lock(&key, &lock_id).await {
                    tracing::error!(key = %key, error = %e, "Failed to release lock on drop");
                } else {
                    tracing::debug!(key = %key, "Lock released on drop");
                }
            });
        }
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}

/// Lock resource name for a customer's checkout.
pub fn checkout_lock_resource(customer_key: &str) -> String {
    format!("{}{}", crate::config::LOCK_RESOURCE_CHECKOUT, customer_key)
}
