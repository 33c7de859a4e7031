//! Basic example demonstrating cacher with the in-process backend

use cacher::prelude::*;
use std::collections::HashSet;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // TRACE shows one event per cache operation
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("=== cacher Basic Example ===\n");

    let cache = Cache::new(CacheConfig::new().driver(Driver::InMemory)).await?;

    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };
    let key = Key::from_parts(["users", "123"]);

    println!("Storing user in cache...");
    cache
        .set(&Data::new(key.clone(), &user), Duration::from_secs(2))
        .await?;

    println!("Retrieving user from cache...");
    let cached: User = cache.get(&key).await?;
    println!("   User: {} <{}>", cached.name, cached.email);

    println!("\nBatch read with a missing key...");
    let keys = [key.clone(), Key::from_parts(["users", "456"])];
    let mut users: Vec<Option<User>> = Vec::new();
    cache.batch_get(&keys, BatchDest::Ordered(&mut users)).await?;
    for (key, user) in keys.iter().zip(&users) {
        println!("   {} -> {:?}", key, user.as_ref().map(|u| &u.name));
    }

    let mut present = HashSet::new();
    cache.batch_get(&keys, BatchDest::presence(&mut present)).await?;
    println!("   present: {:?}", present);

    println!("\nWaiting for the TTL to lapse...");
    tokio::time::sleep(Duration::from_secs(2)).await;
    match cache.get::<User>(&key).await {
        Err(CacheError::Expired(k)) => println!("   {} expired", k),
        other => println!("   unexpected: {:?}", other.map(|u| u.id)),
    }
    match cache.get::<User>(&key).await {
        Err(CacheError::NotFound(k)) => println!("   {} is gone", k),
        other => println!("   unexpected: {:?}", other.map(|u| u.id)),
    }

    println!("\nStats: {:?}", cache.stats());
    Ok(())
}
