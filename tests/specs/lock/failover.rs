//! Failover specs
//!
//! Verify behavior when some stores are unreachable.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn one_of_three_down_still_acquires() {
    let cluster = Cluster::with_down(3, 1);
    let coordinator = cluster.coordinator();

    let lock = must_acquire(&coordinator, "orders").await;

    assert_eq!(
        cluster.holders("orders"),
        vec![Some(lock.token().clone()), Some(lock.token().clone()), None]
    );
}

#[tokio::test]
async fn two_of_three_down_fails_after_three_rounds() {
    let cluster = Cluster::with_down(3, 2);
    let coordinator = cluster.coordinator();

    let acquisition = coordinator.acquire("orders", TTL).await.unwrap();

    assert_eq!(
        acquisition,
        Acquisition::Failed {
            attempts: 3,
            reason: RoundFailure::QuorumNotReached {
                granted: 1,
                quorum: 2,
            },
        }
    );
    for store in cluster.stores() {
        assert_eq!(store.acquire_calls(), 3);
        // One sweep per lost round plus the final sweep
        assert_eq!(store.release_calls(), 4);
    }
    // The lone reachable store does not keep a stray token
    assert_eq!(cluster.held_on("orders"), 0);
}

#[tokio::test]
async fn each_lost_round_sweeps_its_own_token() {
    let cluster = Cluster::with_down(3, 2);
    let coordinator = cluster.coordinator();

    coordinator.acquire("orders", TTL).await.unwrap();

    let calls = cluster.store(0).calls();
    let mut round_tokens = Vec::new();
    for pair in calls.chunks(2).take(3) {
        match pair {
            [RecordedCall::Acquire { value: acquired, .. }, RecordedCall::Release { value: released, .. }] => {
                assert_eq!(acquired, released);
                round_tokens.push(acquired.clone());
            }
            other => panic!("expected acquire then release, got {:?}", other),
        }
    }
    round_tokens.dedup();
    assert_eq!(round_tokens.len(), 3, "every round must use a fresh token");

    // The final sweep targets the last round's token
    match calls.last() {
        Some(RecordedCall::Release { value, .. }) => assert_eq!(value, &round_tokens[2]),
        other => panic!("expected final release, got {:?}", other),
    }
}

#[tokio::test]
async fn majority_of_five_survives_two_failures() {
    let cluster = Cluster::with_down(5, 2);
    let coordinator = cluster.coordinator();

    assert_eq!(coordinator.quorum(), 3);
    must_acquire(&coordinator, "orders").await;
    assert_eq!(cluster.held_on("orders"), 3);
}

#[tokio::test]
async fn recovered_stores_restore_availability() {
    let cluster = Cluster::with_down(3, 2);
    let coordinator = cluster.coordinator();
    assert!(!coordinator.acquire("orders", TTL).await.unwrap().is_acquired());

    cluster.store(1).set_down(false);
    must_acquire(&coordinator, "orders").await;
}

#[tokio::test]
async fn empty_cluster_never_grants() {
    let cluster = Cluster::healthy(0);
    let coordinator = cluster.coordinator();

    assert_eq!(coordinator.quorum(), 1);
    assert_eq!(
        coordinator.acquire("orders", TTL).await.unwrap(),
        Acquisition::Failed {
            attempts: 3,
            reason: RoundFailure::QuorumNotReached {
                granted: 0,
                quorum: 1,
            },
        }
    );
}

#[tokio::test]
async fn slow_store_is_cut_off_by_timeout() {
    let cluster = Cluster::healthy(3);
    cluster.store(2).set_latency(Some(Duration::from_millis(500)));
    let coordinator = cluster.coordinator_with(
        CoordinatorConfig::new()
            .with_retry_delay(Duration::from_millis(1))
            .with_store_timeout(Duration::from_millis(20)),
    );

    let lock = must_acquire(&coordinator, "orders").await;

    let holders = cluster.holders("orders");
    assert_eq!(holders[0], Some(lock.token().clone()));
    assert_eq!(holders[1], Some(lock.token().clone()));
    assert_eq!(holders[2], None);
}
