use std::time::Duration;

use redislock::core::LockError;
use redislock::lock::Locker;
use redislock::test_utils::{contenders, contenders_with};

#[tokio::test(start_paused = true)]
async fn test_unreleased_lock_expires_on_its_own() {
    let (store, handles) = contenders(2);

    handles[0].lock("res").await.unwrap();
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(matches!(handles[1].lock("res").await, Err(LockError::Taken)));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(store.get("res-lock").is_none());
    assert!(handles[1].lock("res").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_custom_expiration_is_written() {
    let (store, handles) = contenders_with(1, Duration::from_millis(1500), Duration::from_millis(200));

    handles[0].lock("short").await.unwrap();
    assert_eq!(store.ttl("short-lock"), Some(Duration::from_millis(1500)));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(store.get("short-lock").is_none());
    assert!(matches!(handles[0].unlock("short").await, Err(LockError::Released)));
}
