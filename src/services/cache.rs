use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ProviderReputation, TargetType};
use crate::services::catalog::CatalogError;
use crate::services::directory::{ActorDirectory, ReputationSink, ResolvedActor, ResolvedTarget, TargetDirectory};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager
///
/// Implements L1 (in-memory) and L2 (Redis) caching strategy.
/// L1 is fastest but limited in size, L2 is shared across instances.
/// Counters used for throttling live only in Redis so every instance sees them.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);
            self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;
            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both L1 and L2)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }

    /// Increment a fixed-window counter and return its new value
    ///
    /// The window starts at the first hit; the key expires after `window_secs`.
    pub async fn hit(&self, key: &str, window_secs: u64) -> Result<u64, CacheError> {
        let mut conn = self.redis.lock().await;
        let count: u64 = redis::cmd("INCR").arg(key).query_async(&mut *conn).await?;
        if count == 1 {
            redis::cmd("EXPIRE")
                .arg(key)
                .arg(window_secs)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        Ok(count)
    }

    /// Health check for the Redis connection
    pub async fn health_check(&self) -> bool {
        let mut conn = self.redis.lock().await;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .is_ok()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a resolved actor
    pub fn actor(actor_id: &str) -> String {
        format!("actor:{}", actor_id)
    }

    /// Build a key for the per-actor swipe throttle window
    pub fn swipe_window(actor_id: &str) -> String {
        format!("swipes:window:{}", actor_id)
    }
}

/// Read-through cache of actor lookups in front of a directory
///
/// Targets are never cached: swipes must see the catalog's current
/// active flag and rating attributes. Cache failures never fail a lookup;
/// they fall through to the inner directory and are logged.
pub struct CachedDirectory<D> {
    inner: D,
    cache: Arc<CacheManager>,
}

impl<D> CachedDirectory<D> {
    pub fn new(inner: D, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }

    async fn remember<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.cache.set(key, value).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
    }

    async fn recall<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.cache.get(key).await {
            Ok(value) => Some(value),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }
}

#[async_trait]
impl<D: TargetDirectory> TargetDirectory for CachedDirectory<D> {
    async fn resolve_target(
        &self,
        target_id: &str,
        target_type: TargetType,
    ) -> Result<Option<ResolvedTarget>, CatalogError> {
        self.inner.resolve_target(target_id, target_type).await
    }
}

#[async_trait]
impl<D: ActorDirectory> ActorDirectory for CachedDirectory<D> {
    async fn resolve_actor(&self, actor_id: &str) -> Result<Option<ResolvedActor>, CatalogError> {
        let key = CacheKey::actor(actor_id);
        if let Some(actor) = self.recall::<ResolvedActor>(&key).await {
            return Ok(Some(actor));
        }

        let actor = self.inner.resolve_actor(actor_id).await?;
        if let Some(actor) = &actor {
            self.remember(&key, actor).await;
        }
        Ok(actor)
    }
}

#[async_trait]
impl<D: ReputationSink> ReputationSink for CachedDirectory<D> {
    async fn publish_reputation(&self, reputation: &ProviderReputation) -> Result<(), CatalogError> {
        self.inner.publish_reputation(reputation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, SeekerAttributes, TargetAttributes};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory that counts lookups reaching it
    struct CountingDirectory {
        targets: AtomicUsize,
        actors: AtomicUsize,
    }

    #[async_trait]
    impl TargetDirectory for CountingDirectory {
        async fn resolve_target(
            &self,
            target_id: &str,
            target_type: TargetType,
        ) -> Result<Option<ResolvedTarget>, CatalogError> {
            let seen = self.targets.fetch_add(1, Ordering::SeqCst);
            Ok(Some(ResolvedTarget {
                target_id: target_id.to_string(),
                target_type,
                // Deactivated after the first lookup
                is_active: seen == 0,
                provider_id: target_id.to_string(),
                attributes: TargetAttributes::default(),
            }))
        }
    }

    #[async_trait]
    impl ActorDirectory for CountingDirectory {
        async fn resolve_actor(&self, actor_id: &str) -> Result<Option<ResolvedActor>, CatalogError> {
            self.actors.fetch_add(1, Ordering::SeqCst);
            Ok(Some(ResolvedActor {
                actor_id: actor_id.to_string(),
                role: Role::Seeker,
                attributes: SeekerAttributes::default(),
            }))
        }
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_targets_bypass_cache_actors_do_not() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 100, 60)
            .await
            .expect("Failed to create cache");
        let directory = CachedDirectory::new(
            CountingDirectory {
                targets: AtomicUsize::new(0),
                actors: AtomicUsize::new(0),
            },
            Arc::new(cache),
        );

        let target_id = uuid::Uuid::new_v4().to_string();
        let first = directory.resolve_target(&target_id, TargetType::Provider).await.unwrap().unwrap();
        let second = directory.resolve_target(&target_id, TargetType::Provider).await.unwrap().unwrap();
        assert!(first.is_active);
        assert!(!second.is_active);
        assert_eq!(directory.inner.targets.load(Ordering::SeqCst), 2);

        let actor_id = uuid::Uuid::new_v4().to_string();
        directory.resolve_actor(&actor_id).await.unwrap();
        directory.resolve_actor(&actor_id).await.unwrap();
        assert_eq!(directory.inner.actors.load(Ordering::SeqCst), 1);

        directory.cache.delete(&CacheKey::actor(&actor_id)).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_hit_counter_counts_within_window() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 10, 60)
            .await
            .expect("Failed to create cache");

        let key = CacheKey::swipe_window(&uuid::Uuid::new_v4().to_string());
        assert_eq!(cache.hit(&key, 60).await.unwrap(), 1);
        assert_eq!(cache.hit(&key, 60).await.unwrap(), 2);
        cache.delete(&key).await.unwrap();
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::actor("user123"), "actor:user123");
        assert_eq!(CacheKey::swipe_window("user123"), "swipes:window:user123");
    }
}
