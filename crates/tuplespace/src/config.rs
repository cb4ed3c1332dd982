// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Lindaspace.
//
// Lindaspace is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Lindaspace is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Lindaspace. If not, see <https://www.gnu.org/licenses/>.

//! TupleSpace Configuration Module
//!
//! ## Configuration Hierarchy
//! 1. **CODE**: Explicit `TupleSpaceConfig` in application code (highest priority)
//! 2. **ENV**: Environment variables (`LINDASPACE_NAMESPACE`, etc.)
//! 3. **FILE**: YAML/TOML configuration files
//! 4. **DEFAULT**: `TupleSpaceConfig::default()` (lowest priority)
//!
//! ## Examples
//!
//! ### From Code
//! ```rust
//! use lindaspace_tuplespace::{Scheduler, TupleSpace, TupleSpaceConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TupleSpaceConfig {
//!     namespace: "workers".to_string(),
//!     initial_capacity: 1024,
//!     waiter_capacity: 16,
//! };
//! let space = TupleSpace::from_config(config, Scheduler::current()?);
//! assert_eq!(space.namespace(), "workers");
//! # Ok(())
//! # }
//! ```
//!
//! ### From Environment Variables
//! ```bash
//! export LINDASPACE_NAMESPACE=workers
//! export LINDASPACE_INITIAL_CAPACITY=1024
//! export LINDASPACE_WAITER_CAPACITY=16
//! ```
//!
//! ### From Config File (YAML)
//! ```yaml
//! namespace: workers
//! initial_capacity: 1024
//! waiter_capacity: 16
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scheduler::Scheduler;
use crate::store::MatchStore;
use crate::{TupleSpace, TupleSpaceError};

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "default";

const ENV_NAMESPACE: &str = "LINDASPACE_NAMESPACE";
const ENV_INITIAL_CAPACITY: &str = "LINDASPACE_INITIAL_CAPACITY";
const ENV_WAITER_CAPACITY: &str = "LINDASPACE_WAITER_CAPACITY";

/// Tuple space settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TupleSpaceConfig {
    /// Label attached to log output
    pub namespace: String,
    /// Resident tuples to reserve room for up front
    pub initial_capacity: usize,
    /// Blocked requests to reserve room for up front
    pub waiter_capacity: usize,
}

impl Default for TupleSpaceConfig {
    fn default() -> Self {
        TupleSpaceConfig {
            namespace: DEFAULT_NAMESPACE.to_string(),
            initial_capacity: 0,
            waiter_capacity: 0,
        }
    }
}

impl TupleSpaceConfig {
    /// Read configuration from environment variables
    ///
    /// Unset variables fall back to defaults.
    ///
    /// ## Environment Variables
    /// - `LINDASPACE_NAMESPACE`: namespace label
    /// - `LINDASPACE_INITIAL_CAPACITY`: reserved tuple slots
    /// - `LINDASPACE_WAITER_CAPACITY`: reserved waiter slots
    ///
    /// ## Errors
    /// - `TupleSpaceError::InvalidConfiguration`: a capacity is not a number
    pub fn from_env() -> Result<Self, TupleSpaceError> {
        let defaults = Self::default();

        Ok(TupleSpaceConfig {
            namespace: std::env::var(ENV_NAMESPACE).unwrap_or(defaults.namespace),
            initial_capacity: env_usize(ENV_INITIAL_CAPACITY)?
                .unwrap_or(defaults.initial_capacity),
            waiter_capacity: env_usize(ENV_WAITER_CAPACITY)?.unwrap_or(defaults.waiter_capacity),
        })
    }

    /// Environment if `LINDASPACE_NAMESPACE` is set, defaults otherwise
    pub fn from_env_or_default() -> Result<Self, TupleSpaceError> {
        if std::env::var(ENV_NAMESPACE).is_ok() {
            Self::from_env()
        } else {
            Ok(Self::default())
        }
    }

    /// Read configuration from a `.yaml`, `.yml` or `.toml` file
    ///
    /// ## Errors
    /// - `TupleSpaceError::InvalidConfiguration`: unreadable file, unknown
    ///   extension or malformed content
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TupleSpaceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TupleSpaceError::InvalidConfiguration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                TupleSpaceError::InvalidConfiguration(format!("Failed to parse TOML config: {}", e))
            }),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
                TupleSpaceError::InvalidConfiguration(format!("Failed to parse YAML config: {}", e))
            }),
            _ => Err(TupleSpaceError::InvalidConfiguration(format!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                path.display()
            ))),
        }
    }
}

fn env_usize(key: &str) -> Result<Option<usize>, TupleSpaceError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<usize>().map(Some).map_err(|e| {
            TupleSpaceError::InvalidConfiguration(format!("{} must be a number: {}", key, e))
        }),
        Err(_) => Ok(None),
    }
}

impl TupleSpace {
    /// Create TupleSpace from explicit configuration
    pub fn from_config(config: TupleSpaceConfig, scheduler: Scheduler) -> Self {
        tracing::debug!(
            namespace = %config.namespace,
            initial_capacity = config.initial_capacity,
            waiter_capacity = config.waiter_capacity,
            "Creating tuple space"
        );

        let store = MatchStore::with_capacity(
            &config.namespace,
            config.initial_capacity,
            config.waiter_capacity,
        );
        Self::with_store(store, scheduler)
    }

    /// Create TupleSpace from environment variables
    pub fn from_env(scheduler: Scheduler) -> Result<Self, TupleSpaceError> {
        Ok(Self::from_config(TupleSpaceConfig::from_env()?, scheduler))
    }

    /// Create TupleSpace from a configuration file
    pub fn from_file(path: impl AsRef<Path>, scheduler: Scheduler) -> Result<Self, TupleSpaceError> {
        Ok(Self::from_config(TupleSpaceConfig::from_file(path)?, scheduler))
    }

    /// Create TupleSpace from environment variables, falling back to defaults
    pub fn from_env_or_default(scheduler: Scheduler) -> Result<Self, TupleSpaceError> {
        Ok(Self::from_config(
            TupleSpaceConfig::from_env_or_default()?,
            scheduler,
        ))
    }
}
