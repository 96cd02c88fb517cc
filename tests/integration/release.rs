use std::time::Duration;

use redislock::core::LockError;
use redislock::lock::Locker;
use redislock::test_utils::contenders;

#[tokio::test]
async fn test_release_twice_reports_released() {
    let (store, handles) = contenders(1);
    let lock = &handles[0];

    lock.lock("res").await.unwrap();
    assert!(lock.unlock("res").await.is_ok());
    assert!(matches!(lock.unlock("res").await, Err(LockError::Released)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_foreign_token_never_deletes_record() {
    let (store, handles) = contenders(2);

    handles[0].lock("res").await.unwrap();
    let owner_token = handles[0].token().await.unwrap().to_string();

    // The second handle holds a token from a different resource.
    handles[1].lock("other").await.unwrap();
    assert!(matches!(handles[1].unlock("res").await, Err(LockError::Released)));

    assert_eq!(store.get("res-lock"), Some(owner_token));
}

#[tokio::test]
async fn test_release_of_overwritten_record() {
    let (store, handles) = contenders(1);
    let lock = &handles[0];

    lock.lock("res").await.unwrap();
    store.set("res-lock", "someone-else", Duration::from_secs(10));

    assert!(matches!(lock.unlock("res").await, Err(LockError::Released)));
    assert_eq!(store.get("res-lock").as_deref(), Some("someone-else"));
}

#[tokio::test]
async fn test_handle_reusable_across_cycles() {
    let (store, handles) = contenders(1);
    let lock = &handles[0];

    for _ in 0..5 {
        lock.lock("cycle").await.unwrap();
        lock.unlock("cycle").await.unwrap();
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_unlock_uses_latest_token() {
    let (store, handles) = contenders(1);
    let lock = &handles[0];

    lock.lock("first").await.unwrap();
    lock.lock("second").await.unwrap();

    // Only the most recent token is remembered.
    assert!(lock.unlock("second").await.is_ok());
    assert!(matches!(lock.unlock("first").await, Err(LockError::Released)));
    assert!(store.get("first-lock").is_some());
}
