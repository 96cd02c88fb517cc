use std::time::Duration;

use redislock::core::{LockError, StoreError};
use redislock::lock::{Locker, StoreLock};
use redislock::store::MemoryStore;

#[tokio::test(start_paused = true)]
async fn test_late_acquisition_is_rejected_but_record_stays() {
    // Call deadline is 2 x 2s = 4s, validity window is 1s + 2s = 3s.
    let store = MemoryStore::new().with_latency(Duration::from_millis(3500));
    let lock = StoreLock::new(store.clone())
        .with_expiration(Duration::from_secs(1))
        .with_drift(Duration::from_secs(2));

    assert!(matches!(lock.lock("res").await, Err(LockError::Taken)));

    // The write went through and is left to expire.
    assert!(lock.token().await.is_none());
    assert!(store.get("res-lock").is_some());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(store.get("res-lock").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_acquisition_within_window_is_kept() {
    let store = MemoryStore::new().with_latency(Duration::from_millis(2500));
    let lock = StoreLock::new(store.clone())
        .with_expiration(Duration::from_secs(1))
        .with_drift(Duration::from_secs(2));

    assert!(lock.lock("res").await.is_ok());
    assert_eq!(
        store.get("res-lock"),
        lock.token().await.map(|t| t.to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_default_timings_time_out_before_drift_check() {
    let store = MemoryStore::new().with_latency(Duration::from_secs(13));
    let lock = StoreLock::new(store);

    let err = lock.lock("res").await.unwrap_err();
    assert!(matches!(err, LockError::Store(StoreError::Timeout { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_release_is_bounded_too() {
    let store = MemoryStore::new();
    let lock = StoreLock::new(store.clone()).with_drift(Duration::from_millis(100));
    lock.lock("res").await.unwrap();

    store.set_latency(Duration::from_secs(1));
    let err = lock.unlock("res").await.unwrap_err();
    assert!(matches!(
        err,
        LockError::Store(StoreError::Timeout { after }) if after == Duration::from_millis(200)
    ));
    assert!(store.get("res-lock").is_some());
}
