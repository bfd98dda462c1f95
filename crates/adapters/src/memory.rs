// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process lock store with per-key expiry
//!
//! Gives the same guarantees as a single key-value server: a conditional
//! set that only succeeds on an absent (or expired) key, and a delete that
//! only removes the key while it still holds the caller's token. Both run
//! under one mutex, so check and mutation are atomic.
//!
//! Expired entries are dropped whenever a call observes them, and every
//! acquire sweeps the whole map, so keys that are never released do not
//! accumulate.

use async_trait::async_trait;
use qlock_core::{Clock, LockStore, StoreError, SystemClock, Token};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: Token,
    expires_at: Instant,
}

/// Shared in-memory store; clones see the same keys
#[derive(Clone, Debug, Default)]
pub struct MemoryStore<C: Clock = SystemClock> {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: C,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> MemoryStore<C> {
    /// Store whose expiry follows `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::default(),
            clock,
        }
    }

    /// Current unexpired token for `key`; an expired entry is dropped
    pub fn holder(&self, key: &str) -> Option<Token> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Time until `key` expires, if held
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }

    /// Number of unexpired keys
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired keys, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl<C: Clock> LockStore for MemoryStore<C> {
    async fn acquire_if_absent(
        &self,
        key: &str,
        value: &Token,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        if ttl.is_zero() {
            return Err(StoreError::Protocol("expiry must be positive".to_string()));
        }

        let now = self.clock.now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Protocol(format!("expiry out of range: {ttl:?}")))?;

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn release_if_matches(&self, key: &str, value: &Token) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at <= now => {
                entries.remove(key);
                Ok(false)
            }
            Some(entry) if &entry.value == value => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
