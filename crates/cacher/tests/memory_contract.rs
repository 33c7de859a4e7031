mod common;

use cacher::prelude::*;

#[tokio::test]
async fn test_memory_contract() {
    let cache = Cache::new(CacheConfig::new().driver(Driver::InMemory))
        .await
        .unwrap();
    common::run_contract(&cache, "").await;
}

#[tokio::test]
async fn test_memory_store_contract() {
    common::run_contract(&MemoryStore::new(), "store:").await;
}
