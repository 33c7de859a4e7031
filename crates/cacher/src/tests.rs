//! Tests for the driver factory and the `Cache` handle

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct TestData {
        id: u64,
        name: String,
    }

    async fn memory_cache() -> Cache {
        Cache::new(CacheConfig::new().driver(Driver::InMemory))
            .await
            .unwrap()
    }

    /// Fixed-window limiter built the way HTTP middleware uses the cache
    async fn allow_request<C: Cacher>(cache: &C, client: &str, limit: i64) -> Result<bool> {
        let key = Key::from_parts(["ratelimit", client]);
        let hits = cache.incr(&key).await?;
        if hits == 1 {
            cache.expire(&key, Duration::from_secs(60)).await?;
        }
        Ok(hits <= limit)
    }

    /// "Notify at most once per window" check used for error alerts
    async fn should_notify<C: Cacher>(cache: &C, fingerprint: &str) -> Result<bool> {
        let data = Data::new(Key::from_parts(["notify", fingerprint]), true);
        cache.set_nx(&data, Duration::from_secs(300)).await
    }

    #[tokio::test]
    async fn test_memory_driver() {
        let cache = memory_cache().await;
        assert_eq!(cache.driver(), Driver::InMemory);
        assert!(cache.as_memory().is_some());

        let data = Data::new(
            "test_key",
            TestData {
                id: 1,
                name: "test".to_string(),
            },
        );
        assert_ok!(cache.set(&data, Duration::from_secs(60)).await);

        let value: TestData = assert_ok!(cache.get(&data.key).await);
        assert_eq!(value, data.value);
    }

    #[tokio::test]
    async fn test_missing_driver_fails() {
        let err = Cache::new(CacheConfig::new()).await.err().unwrap();
        assert_eq!(err, CacheError::DriverUnavailable);
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_non_numeric_database_fails_before_connecting() {
        // the host does not resolve; validation has to fail first
        let config = CacheConfig::new()
            .driver(Driver::Redis)
            .host("cache.invalid:6379")
            .database("primary");

        let err = Cache::new(config).await.err().unwrap();
        assert_eq!(err, CacheError::InvalidDatabase("primary".to_string()));
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_redis_driver_builds_lazily() {
        let config = CacheConfig::new()
            .driver(Driver::Redis)
            .host("127.0.0.1:1")
            .database("2")
            .connection_timeout(Duration::from_millis(100));

        let cache = assert_ok!(Cache::new(config).await);
        assert_eq!(cache.driver(), Driver::Redis);
        assert!(cache.as_memory().is_none());

        let store = cache.as_redis().unwrap();
        assert_eq!(store.config().url, "redis://127.0.0.1:1/2");
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_redis_password_with_reserved_characters() {
        for password in ["p@ss/w#rd", "ab/cd", "a#b"] {
            let config = CacheConfig::new()
                .driver(Driver::Redis)
                .host("cache.internal:6379")
                .password(password)
                .database("3");

            let cache = assert_ok!(Cache::new(config).await);
            let store = cache.as_redis().unwrap();
            assert!(store.config().url.ends_with("@cache.internal:6379/3"));
        }
    }

    #[tokio::test]
    async fn test_from_store() {
        let store = MemoryStore::new();
        store
            .set(&Data::new("k", 7), Duration::from_secs(60))
            .await
            .unwrap();

        let cache = Cache::from(store);
        assert_eq!(cache.get::<i32>(&"k".into()).await.unwrap(), 7);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_through_cache() {
        let cache = memory_cache().await;
        let key = Key::from("session:abc");
        cache
            .set(&Data::new(key.clone(), "payload"), Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;

        let err = assert_err!(cache.get::<String>(&key).await);
        assert_eq!(err, CacheError::Expired("session:abc".to_string()));
        let err = assert_err!(cache.get::<String>(&key).await);
        assert_eq!(err, CacheError::NotFound("session:abc".to_string()));
    }

    #[tokio::test]
    async fn test_batch_dest_variants() {
        let cache = memory_cache().await;
        let ttl = Duration::from_secs(60);
        cache
            .batch_set(&[Data::new("K1", 1), Data::new("K3", 3)], ttl)
            .await
            .unwrap();

        let keys = [Key::from("K1"), Key::from("K2"), Key::from("K3")];

        let mut present = HashSet::new();
        cache
            .batch_get(&keys, BatchDest::presence(&mut present))
            .await
            .unwrap();
        assert_eq!(present, HashSet::from([Key::from("K1"), Key::from("K3")]));

        let mut values: Vec<Option<i32>> = Vec::new();
        cache
            .batch_get(&keys, BatchDest::Ordered(&mut values))
            .await
            .unwrap();
        assert_eq!(values, vec![Some(1), None, Some(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_pattern() {
        let cache = memory_cache().await;

        for _ in 0..3 {
            assert!(allow_request(&cache, "10.0.0.1", 3).await.unwrap());
        }
        assert!(!allow_request(&cache, "10.0.0.1", 3).await.unwrap());
        assert!(allow_request(&cache, "10.0.0.2", 3).await.unwrap());

        // the window resets once the counter's TTL lapses
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(allow_request(&cache, "10.0.0.1", 3).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_dedup_pattern() {
        let cache = memory_cache().await;

        assert!(should_notify(&cache, "panic:handler.rs:42").await.unwrap());
        assert!(!should_notify(&cache, "panic:handler.rs:42").await.unwrap());
        assert!(should_notify(&cache, "timeout:db").await.unwrap());

        tokio::time::advance(Duration::from_secs(300)).await;
        assert!(should_notify(&cache, "panic:handler.rs:42").await.unwrap());
    }

    #[tokio::test]
    async fn test_clone_shares_backend() {
        let cache1 = memory_cache().await;
        cache1
            .set(&Data::new("key", 42), Duration::from_secs(60))
            .await
            .unwrap();

        let cache2 = cache1.clone();
        assert_eq!(cache2.get::<i32>(&"key".into()).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_separate_instances_do_not_share() {
        let cache1 = memory_cache().await;
        let cache2 = memory_cache().await;
        cache1
            .set(&Data::new("key", 42), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache2.get::<i32>(&"key".into()).await.unwrap_err().is_miss());
    }
}
