//! Acquisition specs
//!
//! Verify quorum acquisition on healthy clusters and contention between
//! callers.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::collections::HashSet;

#[tokio::test]
async fn healthy_cluster_grants_lock_with_drift_deducted() {
    let cluster = Cluster::healthy(3);
    let coordinator = cluster.coordinator();

    let lock = must_acquire(&coordinator, "orders").await;

    // 10s TTL: 1% drift (100ms) plus 2ms fixed allowance
    assert_eq!(lock.validity(), Duration::from_millis(9_898));
    assert!(lock.validity() > Duration::ZERO && lock.validity() < TTL);
    assert_eq!(cluster.held_on("orders"), 3);
}

#[tokio::test]
async fn held_lock_rejects_second_caller() {
    let cluster = Cluster::healthy(3);
    let first = cluster.coordinator();
    let second = cluster.coordinator();

    let lock = must_acquire(&first, "orders").await;
    let denied = second.acquire("orders", TTL).await.unwrap();

    assert_eq!(
        denied,
        Acquisition::Failed {
            attempts: 3,
            reason: RoundFailure::QuorumNotReached {
                granted: 0,
                quorum: 2,
            },
        }
    );
    assert_eq!(
        cluster.holders("orders"),
        vec![Some(lock.token().clone()); 3]
    );
}

#[tokio::test]
async fn lock_unlock_lock_succeeds() {
    let cluster = Cluster::healthy(3);
    let coordinator = cluster.coordinator();

    let lock = must_acquire(&coordinator, "orders").await;
    coordinator.release(&lock).await;
    assert_eq!(cluster.held_on("orders"), 0);

    let again = must_acquire(&coordinator, "orders").await;
    assert_ne!(again.token(), lock.token());
    assert_eq!(cluster.held_on("orders"), 3);
}

#[tokio::test]
async fn single_store_cluster_behaves_like_a_plain_lock() {
    let cluster = Cluster::healthy(1);
    let coordinator = cluster.coordinator();

    let lock = must_acquire(&coordinator, "orders").await;
    assert!(!coordinator.acquire("orders", TTL).await.unwrap().is_acquired());

    coordinator.release(&lock).await;
    must_acquire(&coordinator, "orders").await;
}

#[tokio::test]
async fn tokens_are_unique_across_acquisitions() {
    let cluster = Cluster::healthy(3);
    let coordinator = cluster.coordinator();

    let mut seen = HashSet::new();
    for i in 0..200 {
        let lock = must_acquire(&coordinator, &format!("resource-{i}")).await;
        assert!(seen.insert(lock.token().clone()), "token reused");
    }
}

#[tokio::test]
async fn lock_expires_on_the_stores_after_ttl() {
    let cluster = Cluster::healthy(3);
    let coordinator = cluster.coordinator();

    let lock = must_acquire(&coordinator, "orders").await;
    assert!(lock.is_valid(cluster.clock()));

    cluster.clock().advance(TTL);
    assert!(!lock.is_valid(cluster.clock()));
    assert_eq!(cluster.held_on("orders"), 0);

    // Nobody released, but the stores' TTL frees the resource
    must_acquire(&coordinator, "orders").await;
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_store_call() {
    let cluster = Cluster::healthy(3);
    let coordinator = cluster.coordinator();

    assert_eq!(
        coordinator.acquire("orders", Duration::ZERO).await,
        Err(LockError::InvalidTtl(Duration::ZERO))
    );
    assert_eq!(
        coordinator.acquire("", TTL).await,
        Err(LockError::InvalidResource)
    );
    for store in cluster.stores() {
        assert!(store.calls().is_empty());
    }
}
