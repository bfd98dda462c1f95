//! Shared fixtures for lock specs

#![allow(dead_code)]

pub use qlock_adapters::{FakeStore, MemoryStore, RecordedCall, TracedStore};
pub use qlock_core::{
    Acquisition, Clock, CoordinatorConfig, FakeClock, Lock, LockError, LockStore,
    QuorumCoordinator, RoundFailure, SequentialTokenGen, StoreOp, Token, TracingHook,
};
pub use std::time::Duration;

pub const TTL: Duration = Duration::from_secs(10);

/// Coordinator type used by the specs: fake stores on a shared fake clock
pub type TestCoordinator = QuorumCoordinator<FakeStore, FakeClock>;

/// A set of fake stores sharing one fake clock
pub struct Cluster {
    clock: FakeClock,
    stores: Vec<FakeStore>,
}

impl Cluster {
    /// `n` reachable stores
    pub fn healthy(n: usize) -> Self {
        let clock = FakeClock::new();
        let stores = (0..n).map(|_| FakeStore::with_clock(clock.clone())).collect();
        Self { clock, stores }
    }

    /// `n` stores, the last `down` of which refuse connections
    pub fn with_down(n: usize, down: usize) -> Self {
        let cluster = Self::healthy(n);
        for store in cluster.stores.iter().skip(n - down) {
            store.set_down(true);
        }
        cluster
    }

    pub fn clock(&self) -> &FakeClock {
        &self.clock
    }

    pub fn store(&self, index: usize) -> &FakeStore {
        &self.stores[index]
    }

    pub fn stores(&self) -> &[FakeStore] {
        &self.stores
    }

    /// Coordinator over this cluster with short retry delays
    pub fn coordinator(&self) -> TestCoordinator {
        self.coordinator_with(CoordinatorConfig::new().with_retry_delay(Duration::from_millis(1)))
    }

    pub fn coordinator_with(&self, config: CoordinatorConfig) -> TestCoordinator {
        QuorumCoordinator::with_config(self.stores.clone(), config)
            .unwrap()
            .with_clock(self.clock.clone())
    }

    /// Token held for `resource` on each store
    pub fn holders(&self, resource: &str) -> Vec<Option<Token>> {
        self.stores.iter().map(|s| s.holder(resource)).collect()
    }

    /// Number of stores on which `resource` is held
    pub fn held_on(&self, resource: &str) -> usize {
        self.holders(resource).iter().filter(|h| h.is_some()).count()
    }
}

/// Unwrap a successful acquisition
pub async fn must_acquire(coordinator: &TestCoordinator, resource: &str) -> Lock {
    match coordinator.acquire(resource, TTL).await.unwrap() {
        Acquisition::Acquired(lock) => lock,
        Acquisition::Failed { attempts, reason } => {
            panic!("expected lock on {resource}, failed after {attempts} rounds: {reason}")
        }
    }
}
