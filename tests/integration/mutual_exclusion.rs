use redislock::core::LockError;
use redislock::lock::Locker;
use redislock::test_utils::{contenders, init_test_logging};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exactly_one_concurrent_acquire_wins() {
    init_test_logging(None);
    let (store, handles) = contenders(16);

    let tasks: Vec<_> = handles
        .iter()
        .cloned()
        .map(|handle| tokio::spawn(async move { handle.lock("shared").await }))
        .collect();

    let mut winners = 0;
    let mut taken = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => winners += 1,
            Err(LockError::Taken) => taken += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(taken, 15);
    assert_eq!(store.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stored_token_belongs_to_winner() {
    let (store, handles) = contenders(8);

    let tasks: Vec<_> = handles
        .iter()
        .cloned()
        .map(|handle| {
            tokio::spawn(async move {
                let won = handle.lock("report").await.is_ok();
                (won, handle)
            })
        })
        .collect();

    for task in tasks {
        let (won, handle) = task.await.unwrap();
        if won {
            let token = handle.token().await.unwrap();
            assert_eq!(store.get("report-lock"), Some(token.to_string()));
        } else {
            assert!(handle.token().await.is_none());
        }
    }
}

#[tokio::test]
async fn test_different_resources_do_not_contend() {
    let (store, handles) = contenders(2);

    handles[0].lock("alpha").await.unwrap();
    handles[1].lock("beta").await.unwrap();

    assert!(store.get("alpha-lock").is_some());
    assert!(store.get("beta-lock").is_some());
}

#[tokio::test]
async fn test_no_reentrancy() {
    let (_store, handles) = contenders(1);

    handles[0].lock("alpha").await.unwrap();
    assert!(matches!(handles[0].lock("alpha").await, Err(LockError::Taken)));
}
