// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lock store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::memory::MemoryStore;
use async_trait::async_trait;
use qlock_core::{FakeClock, LockStore, StoreError, Token};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Acquire {
        key: String,
        value: Token,
        ttl: Duration,
    },
    Release {
        key: String,
        value: Token,
    },
}

/// Memory-backed store that can be taken down, slowed, and inspected
#[derive(Clone)]
pub struct FakeStore {
    inner: MemoryStore<FakeClock>,
    clock: FakeClock,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    down: Arc<AtomicBool>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::with_clock(FakeClock::new())
    }

    /// Store whose key expiry follows a shared fake clock
    pub fn with_clock(clock: FakeClock) -> Self {
        Self {
            inner: MemoryStore::with_clock(clock.clone()),
            clock,
            calls: Arc::default(),
            down: Arc::default(),
            latency: Arc::default(),
        }
    }

    /// A store that refuses every connection
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_down(true);
        store
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Delay every call by `latency` (real time)
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    pub fn clock(&self) -> &FakeClock {
        &self.clock
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn acquire_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RecordedCall::Acquire { .. }))
            .count()
    }

    pub fn release_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RecordedCall::Release { .. }))
            .count()
    }

    /// Current holder of `key`, ignoring availability
    pub fn holder(&self, key: &str) -> Option<Token> {
        self.inner.holder(key)
    }

    async fn simulate_network(&self) -> Result<(), StoreError> {
        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl Default for FakeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockStore for FakeStore {
    async fn acquire_if_absent(
        &self,
        key: &str,
        value: &Token,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall::Acquire {
                key: key.to_string(),
                value: value.clone(),
                ttl,
            });
        self.simulate_network().await?;
        self.inner.acquire_if_absent(key, value, ttl).await
    }

    async fn release_if_matches(&self, key: &str, value: &Token) -> Result<bool, StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall::Release {
                key: key.to_string(),
                value: value.clone(),
            });
        self.simulate_network().await?;
        self.inner.release_if_matches(key, value).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
