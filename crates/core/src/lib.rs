// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! qlock-core: quorum locking over independent lock stores
//!
//! This crate provides:
//! - The `LockStore` capability trait that each backing store implements
//! - `QuorumCoordinator`, which acquires a lock on a majority of stores
//!   and computes how long the lock can be trusted
//! - Token generation, jittered retries, and a testable clock
//! - A call hook for auditing every store call

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hook;
pub mod lock;
pub mod retry;
pub mod store;
pub mod token;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::CoordinatorConfig;
pub use coordinator::QuorumCoordinator;
pub use error::{ConfigError, LockError};
pub use hook::{DirectCall, StoreCall, StoreCallHook, StoreOp, TracingHook};
pub use lock::{Acquisition, Lock, RoundFailure};
pub use retry::RetryPolicy;
pub use store::{LockStore, StoreError, StoreOutcome};
pub use token::{SequentialTokenGen, Token, TokenGen, UuidTokenGen};
