// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-facing error types
//!
//! Store failures never surface here: they are folded into per-store
//! outcomes (see [`crate::store::StoreOutcome`]), and a failed acquisition is
//! reported as [`crate::lock::Acquisition::Failed`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Invalid input to `acquire`; returned before any store is contacted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock ttl must be greater than zero, got {0:?}")]
    InvalidTtl(Duration),
    #[error("resource key must not be empty")]
    InvalidResource,
}

/// Errors loading or validating a [`crate::config::CoordinatorConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
