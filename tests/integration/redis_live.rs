use redislock::config::StoreConfig;
use redislock::core::LockError;
use redislock::lock::{Locker, StoreLock};
use redislock::store::RedisStore;

#[tokio::test]
#[ignore = "needs a Redis server at REDISLOCK_TEST_URL"]
async fn test_handover_against_redis() {
    let Ok(endpoint) = std::env::var("REDISLOCK_TEST_URL") else {
        eprintln!("REDISLOCK_TEST_URL not set, skipping");
        return;
    };
    let config = StoreConfig {
        endpoint,
        ..StoreConfig::default()
    };
    let store = RedisStore::connect(&config).await.unwrap();

    let resource = format!("redislock-test-{}", rand::random::<u32>());
    let a = StoreLock::new(store.clone());
    let b = StoreLock::new(store.clone());

    assert!(a.lock(&resource).await.is_ok());
    assert!(matches!(b.lock(&resource).await, Err(LockError::Taken)));
    assert!(a.unlock(&resource).await.is_ok());
    assert!(matches!(a.unlock(&resource).await, Err(LockError::Released)));
    assert!(b.lock(&resource).await.is_ok());
    assert!(b.unlock(&resource).await.is_ok());

    store.quit().await.unwrap();
}
