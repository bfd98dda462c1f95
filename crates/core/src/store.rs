// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability trait for a single lock store

use crate::token::Token;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A store call that could not be completed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store protocol error: {0}")]
    Protocol(String),
}

/// One independent store holding lock keys with an expiry.
///
/// Implementations must fail closed: a connectivity problem is an `Err` or
/// `Ok(false)`, never `Ok(true)`.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Atomically set `key = value` with expiry `ttl` if `key` is absent.
    /// Returns whether the set happened.
    async fn acquire_if_absent(
        &self,
        key: &str,
        value: &Token,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Atomically delete `key` if it currently holds `value`.
    /// Returns whether a key was deleted.
    async fn release_if_matches(&self, key: &str, value: &Token) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S: LockStore + ?Sized> LockStore for Arc<S> {
    async fn acquire_if_absent(
        &self,
        key: &str,
        value: &Token,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        (**self).acquire_if_absent(key, value, ttl).await
    }

    async fn release_if_matches(&self, key: &str, value: &Token) -> Result<bool, StoreError> {
        (**self).release_if_matches(key, value).await
    }
}

#[async_trait]
impl<S: LockStore + ?Sized> LockStore for Box<S> {
    async fn acquire_if_absent(
        &self,
        key: &str,
        value: &Token,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        (**self).acquire_if_absent(key, value, ttl).await
    }

    async fn release_if_matches(&self, key: &str, value: &Token) -> Result<bool, StoreError> {
        (**self).release_if_matches(key, value).await
    }
}

/// How a single store answered an acquire call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The key was set to this round's token
    Granted,
    /// The store answered but the key is already held
    Refused,
    /// The call errored or timed out
    Unavailable(StoreError),
}

impl StoreOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, StoreOutcome::Granted)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreOutcome::Unavailable(_))
    }
}

impl From<Result<bool, StoreError>> for StoreOutcome {
    fn from(result: Result<bool, StoreError>) -> Self {
        match result {
            Ok(true) => StoreOutcome::Granted,
            Ok(false) => StoreOutcome::Refused,
            Err(e) => StoreOutcome::Unavailable(e),
        }
    }
}
