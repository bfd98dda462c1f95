// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quorum acquisition and release across independent stores
//!
//! A round writes a fresh token to every store concurrently, counts the
//! stores that granted it, and subtracts the round's elapsed time and a
//! clock-drift allowance from the TTL. The round wins only if a majority
//! granted the token and some validity is left. A losing round deletes its
//! token everywhere before the next round starts.

use crate::clock::{Clock, SystemClock};
use crate::config::CoordinatorConfig;
use crate::error::{ConfigError, LockError};
use crate::hook::{DirectCall, StoreCall, StoreCallHook, StoreOp};
use crate::lock::{Acquisition, Lock, RoundFailure};
use crate::store::{LockStore, StoreError, StoreOutcome};
use crate::token::{Token, TokenGen, UuidTokenGen};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lock coordinator over a fixed set of stores.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct QuorumCoordinator<S, C = SystemClock, G = UuidTokenGen, H = DirectCall> {
    stores: Vec<S>,
    quorum: usize,
    config: CoordinatorConfig,
    clock: C,
    token_gen: G,
    hook: H,
}

/// A lost round and the token it wrote
struct FailedRound {
    reason: RoundFailure,
    token: Token,
}

impl<S: LockStore> QuorumCoordinator<S> {
    pub fn new(stores: impl IntoIterator<Item = S>) -> Self {
        Self::assemble(stores, CoordinatorConfig::default())
    }

    /// Coordinator with tuned settings; rejects a config that fails
    /// [`CoordinatorConfig::validate`]
    pub fn with_config(
        stores: impl IntoIterator<Item = S>,
        config: CoordinatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(stores, config))
    }

    fn assemble(stores: impl IntoIterator<Item = S>, config: CoordinatorConfig) -> Self {
        let stores: Vec<S> = stores.into_iter().collect();
        let quorum = stores.len() / 2 + 1;
        Self {
            stores,
            quorum,
            config,
            clock: SystemClock,
            token_gen: UuidTokenGen,
            hook: DirectCall,
        }
    }
}

impl<S, C, G, H> QuorumCoordinator<S, C, G, H> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> QuorumCoordinator<S, C2, G, H> {
        QuorumCoordinator {
            stores: self.stores,
            quorum: self.quorum,
            config: self.config,
            clock,
            token_gen: self.token_gen,
            hook: self.hook,
        }
    }

    pub fn with_token_gen<G2: TokenGen>(self, token_gen: G2) -> QuorumCoordinator<S, C, G2, H> {
        QuorumCoordinator {
            stores: self.stores,
            quorum: self.quorum,
            config: self.config,
            clock: self.clock,
            token_gen,
            hook: self.hook,
        }
    }

    /// Route every store call through `hook`
    pub fn with_hook<H2: StoreCallHook>(self, hook: H2) -> QuorumCoordinator<S, C, G, H2> {
        QuorumCoordinator {
            stores: self.stores,
            quorum: self.quorum,
            config: self.config,
            clock: self.clock,
            token_gen: self.token_gen,
            hook,
        }
    }

    /// Stores that must grant a token: `floor(N / 2) + 1`
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}

impl<S, C, G, H> QuorumCoordinator<S, C, G, H>
where
    S: LockStore,
    C: Clock,
    G: TokenGen,
    H: StoreCallHook,
{
    /// Acquire `resource` for `ttl` on a quorum of stores.
    ///
    /// Only invalid input is an `Err`. Losing every round is
    /// `Ok(Acquisition::Failed)`.
    pub async fn acquire(&self, resource: &str, ttl: Duration) -> Result<Acquisition, LockError> {
        if ttl.is_zero() {
            return Err(LockError::InvalidTtl(ttl));
        }
        if resource.is_empty() {
            return Err(LockError::InvalidResource);
        }

        let policy = self.config.retry_policy();
        let outcome = policy
            .run(|attempt| self.attempt_round(resource, ttl, attempt))
            .await;

        match outcome {
            Ok(lock) => Ok(Acquisition::Acquired(lock)),
            Err(last) => {
                // Final sweep for the last round's token
                self.release_token(resource, &last.token).await;
                warn!(
                    resource,
                    attempts = policy.count(),
                    reason = %last.reason,
                    "failed to acquire lock"
                );
                Ok(Acquisition::Failed {
                    attempts: policy.count(),
                    reason: last.reason,
                })
            }
        }
    }

    /// Delete the lock's token from every store.
    ///
    /// Best effort: store failures are logged and dropped, and the stores'
    /// own TTL reclaims whatever could not be deleted.
    pub async fn release(&self, lock: &Lock) {
        self.release_token(lock.resource(), lock.token()).await;
    }

    async fn attempt_round(
        &self,
        resource: &str,
        ttl: Duration,
        attempt: u32,
    ) -> Result<Lock, FailedRound> {
        let token = self.token_gen.next();
        let start = self.clock.now();

        let outcomes = self.acquire_on_all(resource, &token, ttl).await;

        let end = self.clock.now();
        let elapsed = end.saturating_duration_since(start);
        let granted = outcomes.iter().filter(|o| o.is_granted()).count();
        let unavailable = outcomes.iter().filter(|o| o.is_unavailable()).count();
        for (store, outcome) in outcomes.iter().enumerate() {
            if let StoreOutcome::Unavailable(e) = outcome {
                warn!(resource, store, error = %e, "store unavailable");
            }
        }

        let drift = self.config.drift_for(ttl);
        let validity = ttl.saturating_sub(elapsed).saturating_sub(drift);

        if granted >= self.quorum && !validity.is_zero() {
            info!(
                resource,
                attempt,
                granted,
                unavailable,
                quorum = self.quorum,
                validity_ms = validity.as_millis() as u64,
                "lock acquired"
            );
            return Ok(Lock::new(resource, token, validity, end));
        }

        let reason = if granted < self.quorum {
            RoundFailure::QuorumNotReached {
                granted,
                quorum: self.quorum,
            }
        } else {
            RoundFailure::ValidityExpired { granted, elapsed }
        };
        debug!(resource, attempt, unavailable, %reason, "round lost");

        self.release_token(resource, &token).await;
        Err(FailedRound { reason, token })
    }

    async fn acquire_on_all(
        &self,
        resource: &str,
        token: &Token,
        ttl: Duration,
    ) -> Vec<StoreOutcome> {
        let bound = self.config.store_timeout.min(ttl);
        let calls = self.stores.iter().enumerate().map(move |(index, store)| {
            let invoke = bounded(bound, store.acquire_if_absent(resource, token, ttl));
            async move {
                let result = self.call_store(StoreOp::Acquire, index, resource, invoke).await;
                StoreOutcome::from(result)
            }
        });
        join_all(calls).await
    }

    async fn release_token(&self, resource: &str, token: &Token) {
        let bound = self.config.store_timeout;
        let calls = self.stores.iter().enumerate().map(move |(index, store)| {
            let invoke = bounded(bound, store.release_if_matches(resource, token));
            self.call_store(StoreOp::Release, index, resource, invoke)
        });
        let results = join_all(calls).await;

        let mut released = 0;
        for (store, result) in results.iter().enumerate() {
            match result {
                Ok(true) => released += 1,
                Ok(false) => {}
                Err(e) => debug!(resource, store, error = %e, "release failed"),
            }
        }
        debug!(resource, %token, released, "release sweep finished");
    }

    fn call_store<'a>(
        &'a self,
        op: StoreOp,
        store: usize,
        resource: &'a str,
        invoke: BoxFuture<'a, Result<bool, StoreError>>,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        let call = StoreCall {
            op,
            store,
            resource,
        };
        self.hook.on_store_call(call, invoke)
    }
}

/// Cap a store call at `limit`, reporting overruns as a timeout
fn bounded<'a, F>(limit: Duration, call: F) -> BoxFuture<'a, Result<bool, StoreError>>
where
    F: Future<Output = Result<bool, StoreError>> + Send + 'a,
{
    async move {
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(limit)),
        }
    }
    .boxed()
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
