use cacher::prelude::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // CACHE_DRIVER=redis CACHE_HOST=127.0.0.1:6379 CACHE_DATABASE=0
    let config = CacheConfig::from_env()?;
    let config = match config.driver {
        Some(_) => config,
        None => config.driver(Driver::Redis),
    };
    println!("Connecting with {:?}", config);

    let cache = Cache::new(config).await?;
    let ttl = Duration::from_secs(300);

    // Set a value
    cache.set(&Data::new("hello", "world"), ttl).await?;

    // Get it back
    match cache.get::<String>(&Key::from("hello")).await {
        Ok(value) => println!("Hit: {}", value),
        Err(CacheError::Connection(e)) => {
            eprintln!("Failed to connect to Redis: {}", e);
            println!("Make sure Redis is running or set CACHE_HOST");
            return Ok(());
        }
        Err(e) => println!("Miss: {}", e),
    }

    // Pipelined batch write
    let sessions: Vec<_> = (0..5)
        .map(|i| Data::new(format!("session:{}", i), i * 10))
        .collect();
    cache.batch_set(&sessions, ttl).await?;

    let keys: Vec<Key> = (0..7)
        .map(|i| Key::from(format!("session:{}", i)))
        .collect();
    let mut values: Vec<Option<i32>> = Vec::new();
    cache.batch_get(&keys, BatchDest::Ordered(&mut values)).await?;
    println!("Sessions: {:?}", values);

    // Raw access for commands outside the cache contract
    if let Some(store) = cache.as_redis() {
        println!("Pool state: {:?}", store.pool().state());
    }

    Ok(())
}
