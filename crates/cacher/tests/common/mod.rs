//! Behaviour every `Cacher` backend has to share

use cacher::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TestStruct {
    pub name: String,
}

/// Ten entries keyed `{prefix}0`..`{prefix}9`, each holding its index as name
pub fn generate_test_key_and_val(prefix: &str) -> (Vec<Data<TestStruct>>, Vec<Key>) {
    let datas: Vec<_> = (0..10)
        .map(|i| {
            Data::new(
                format!("{}{}", prefix, i),
                TestStruct {
                    name: i.to_string(),
                },
            )
        })
        .collect();
    let keys = datas.iter().map(|d| d.key.clone()).collect();
    (datas, keys)
}

pub async fn run_contract<C: Cacher>(cache: &C, prefix: &str) {
    let (datas, keys) = generate_test_key_and_val(prefix);

    batch_get_before_set(cache, &keys).await;
    batch_set(cache, &datas).await;
    batch_get_ordered(cache, &keys).await;

    let mut with_missing = keys.clone();
    with_missing.push(Key::from(format!("{}none key", prefix)));
    batch_get_ordered(cache, &with_missing).await;
    batch_get_presence(cache, &with_missing).await;

    set_and_get(cache, Key::from(format!("{}testKey", prefix))).await;
    delete_is_idempotent(cache, Key::from(format!("{}gone", prefix))).await;
    set_nx_once(cache, Key::from(format!("{}lock", prefix))).await;
    counter(cache, Key::from(format!("{}counter", prefix))).await;
    shape_mismatch(cache, Key::from(format!("{}shape", prefix))).await;
}

async fn batch_get_before_set<C: Cacher>(cache: &C, keys: &[Key]) {
    let mut dest: Vec<Option<TestStruct>> = Vec::new();
    cache
        .batch_get(keys, BatchDest::Ordered(&mut dest))
        .await
        .unwrap();
    assert_eq!(dest.len(), keys.len());
    assert!(dest.iter().all(Option::is_none));
}

async fn batch_set<C: Cacher>(cache: &C, datas: &[Data<TestStruct>]) {
    cache.batch_set(datas, Duration::from_secs(30)).await.unwrap();
}

async fn batch_get_ordered<C: Cacher>(cache: &C, keys: &[Key]) {
    let mut dest: Vec<Option<TestStruct>> = Vec::new();
    cache
        .batch_get(keys, BatchDest::Ordered(&mut dest))
        .await
        .unwrap();

    assert_eq!(dest.len(), keys.len());
    for (i, item) in dest.iter().take(10).enumerate() {
        assert_eq!(item.as_ref().unwrap().name, i.to_string());
    }
    for item in dest.iter().skip(10) {
        assert!(item.is_none());
    }
}

async fn batch_get_presence<C: Cacher>(cache: &C, keys: &[Key]) {
    let mut found = HashSet::new();
    cache
        .batch_get(keys, BatchDest::presence(&mut found))
        .await
        .unwrap();

    assert_eq!(found.len(), 10);
    assert!(keys[..10].iter().all(|k| found.contains(k)));
    assert!(!found.contains(&keys[10]));
}

async fn set_and_get<C: Cacher>(cache: &C, key: Key) {
    let data = Data::new(key.clone(), TestStruct { name: "test".into() });
    cache.set(&data, Duration::from_secs(30)).await.unwrap();

    let got: TestStruct = cache.get(&key).await.unwrap();
    assert_eq!(got, data.value);
}

async fn delete_is_idempotent<C: Cacher>(cache: &C, key: Key) {
    cache
        .set(&Data::new(key.clone(), 1), Duration::from_secs(30))
        .await
        .unwrap();
    cache.delete(&key).await.unwrap();
    cache.delete(&key).await.unwrap();

    let err = cache.get::<i32>(&key).await.unwrap_err();
    assert_eq!(err, CacheError::NotFound(key.to_string()));
}

async fn set_nx_once<C: Cacher>(cache: &C, key: Key) {
    let ttl = Duration::from_secs(30);
    assert!(cache.set_nx(&Data::new(key.clone(), "first"), ttl).await.unwrap());
    assert!(!cache.set_nx(&Data::new(key.clone(), "second"), ttl).await.unwrap());
    assert_eq!(cache.get::<String>(&key).await.unwrap(), "first");
}

async fn counter<C: Cacher>(cache: &C, key: Key) {
    assert!(!cache.expire(&key, Duration::from_secs(30)).await.unwrap());
    assert_eq!(cache.incr(&key).await.unwrap(), 1);
    assert_eq!(cache.incr(&key).await.unwrap(), 2);
    assert!(cache.expire(&key, Duration::from_secs(30)).await.unwrap());
    assert_eq!(cache.get::<i64>(&key).await.unwrap(), 2);
}

async fn shape_mismatch<C: Cacher>(cache: &C, key: Key) {
    cache
        .set(&Data::new(key.clone(), vec![1, 2, 3]), Duration::from_secs(30))
        .await
        .unwrap();
    let err = cache.get::<TestStruct>(&key).await.unwrap_err();
    assert!(matches!(err, CacheError::Deserialization(_)));
}
