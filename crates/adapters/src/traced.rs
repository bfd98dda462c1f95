// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use async_trait::async_trait;
use qlock_core::{LockStore, StoreError, Token};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Wrapper that adds tracing to any LockStore
#[derive(Clone, Debug)]
pub struct TracedStore<S> {
    name: String,
    inner: S,
}

impl<S> TracedStore<S> {
    /// `name` identifies the store in log output (e.g. its address)
    pub fn new(name: impl Into<String>, inner: S) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: LockStore> LockStore for TracedStore<S> {
    async fn acquire_if_absent(
        &self,
        key: &str,
        value: &Token,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let span = tracing::info_span!("store.acquire_if_absent", store = %self.name, key);

        async {
            tracing::debug!(ttl_ms = ttl.as_millis() as u64, "requesting");

            let start = Instant::now();
            let result = self.inner.acquire_if_absent(key, value, ttl).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(true) => tracing::debug!(elapsed_ms, "granted"),
                Ok(false) => tracing::debug!(elapsed_ms, "already held"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "acquire failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn release_if_matches(&self, key: &str, value: &Token) -> Result<bool, StoreError> {
        let span = tracing::info_span!("store.release_if_matches", store = %self.name, key);

        async {
            let result = self.inner.release_if_matches(key, value).await;
            // A failed release is tolerated; the key expires on its own
            match &result {
                Ok(deleted) => tracing::debug!(deleted, "released"),
                Err(e) => tracing::warn!(error = %e, "release failed (key will expire)"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
