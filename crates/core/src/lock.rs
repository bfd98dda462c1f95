// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock values handed back to callers

use crate::clock::Clock;
use crate::token::Token;
use std::fmt;
use std::time::{Duration, Instant};

/// A lock held on a quorum of stores.
///
/// Holds no store handles; it is only the resource, the token written to
/// the stores, and how long the holder may assume exclusivity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lock {
    resource: String,
    token: Token,
    validity: Duration,
    acquired_at: Instant,
}

impl Lock {
    pub fn new(
        resource: impl Into<String>,
        token: Token,
        validity: Duration,
        acquired_at: Instant,
    ) -> Self {
        Self {
            resource: resource.into(),
            token,
            validity,
            acquired_at,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Validity window measured from `acquired_at`
    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// Validity left according to `clock`, zero once expired
    pub fn remaining(&self, clock: &impl Clock) -> Duration {
        self.validity.saturating_sub(clock.elapsed_since(self.acquired_at))
    }

    /// Whether the holder may still act under this lock.
    ///
    /// Advisory only: stores expire the key on their own TTL regardless.
    pub fn is_valid(&self, clock: &impl Clock) -> bool {
        !self.remaining(clock).is_zero()
    }
}

/// Why a single acquisition round did not produce a lock
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundFailure {
    /// Fewer stores than the quorum granted the token
    QuorumNotReached { granted: usize, quorum: usize },
    /// Quorum was reached, but the round took so long that no validity
    /// remained after drift compensation
    ValidityExpired { granted: usize, elapsed: Duration },
}

impl fmt::Display for RoundFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundFailure::QuorumNotReached { granted, quorum } => {
                write!(f, "quorum not reached ({}/{})", granted, quorum)
            }
            RoundFailure::ValidityExpired { granted, elapsed } => write!(
                f,
                "validity expired after {}ms ({} stores granted)",
                elapsed.as_millis(),
                granted
            ),
        }
    }
}

/// Result of `QuorumCoordinator::acquire`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acquisition {
    Acquired(Lock),
    /// Every round failed; `reason` describes the last one
    Failed { attempts: u32, reason: RoundFailure },
}

impl Acquisition {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Acquisition::Acquired(_))
    }

    pub fn lock(&self) -> Option<&Lock> {
        match self {
            Acquisition::Acquired(lock) => Some(lock),
            Acquisition::Failed { .. } => None,
        }
    }

    pub fn into_lock(self) -> Option<Lock> {
        match self {
            Acquisition::Acquired(lock) => Some(lock),
            Acquisition::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
