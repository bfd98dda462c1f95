// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interception of individual store calls
//!
//! Every acquire and release the coordinator sends to a store is routed
//! through a [`StoreCallHook`]. The hook receives the pending call and must
//! drive it to completion; it may observe, time, or audit it on the way.

use crate::store::StoreError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::time::Instant;
use tracing::Instrument;

/// Which store operation is being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Acquire,
    Release,
}

impl StoreOp {
    pub fn name(&self) -> &'static str {
        match self {
            StoreOp::Acquire => "acquire",
            StoreOp::Release => "release",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Description of a store call handed to the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCall<'a> {
    pub op: StoreOp,
    /// Index of the store in the coordinator's store list
    pub store: usize,
    pub resource: &'a str,
}

/// Strategy wrapped around every store call
#[async_trait]
pub trait StoreCallHook: Send + Sync + 'static {
    async fn on_store_call(
        &self,
        call: StoreCall<'_>,
        invoke: BoxFuture<'_, Result<bool, StoreError>>,
    ) -> Result<bool, StoreError>;
}

/// Runs the call unmodified
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectCall;

#[async_trait]
impl StoreCallHook for DirectCall {
    async fn on_store_call(
        &self,
        _call: StoreCall<'_>,
        invoke: BoxFuture<'_, Result<bool, StoreError>>,
    ) -> Result<bool, StoreError> {
        invoke.await
    }
}

/// Records each store call in its own span with its latency
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHook;

#[async_trait]
impl StoreCallHook for TracingHook {
    async fn on_store_call(
        &self,
        call: StoreCall<'_>,
        invoke: BoxFuture<'_, Result<bool, StoreError>>,
    ) -> Result<bool, StoreError> {
        let span = match call.op {
            StoreOp::Acquire => {
                tracing::debug_span!("store.acquire", store = call.store, resource = call.resource)
            }
            StoreOp::Release => {
                tracing::debug_span!("store.release", store = call.store, resource = call.resource)
            }
        };

        let start = Instant::now();
        let result = invoke.instrument(span.clone()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        span.in_scope(|| match &result {
            Ok(applied) => tracing::debug!(applied, elapsed_ms, "store call completed"),
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "store call failed"),
        });

        result
    }
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
