use std::time::Duration;

use redislock::core::LockError;
use redislock::lock::Locker;
use redislock::test_utils::contenders;

#[tokio::test]
async fn test_handover_after_unlock() {
    let (_store, handles) = contenders(2);
    let (a, b) = (&handles[0], &handles[1]);

    assert!(a.lock("res1").await.is_ok());
    assert!(matches!(b.lock("res1").await, Err(LockError::Taken)));
    assert!(a.unlock("res1").await.is_ok());
    assert!(b.lock("res1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_stale_holder_cannot_release_new_holder() {
    let (store, handles) = contenders(2);
    let (a, b) = (&handles[0], &handles[1]);

    assert!(a.lock("res2").await.is_ok());
    tokio::time::sleep(Duration::from_secs(11)).await;

    assert!(b.lock("res2").await.is_ok());
    assert!(matches!(a.unlock("res2").await, Err(LockError::Released)));

    let b_token = b.token().await.unwrap();
    assert_eq!(store.get("res2-lock"), Some(b_token.to_string()));
    assert!(b.unlock("res2").await.is_ok());
}
