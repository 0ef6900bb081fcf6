// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types surfaced by the assembly core.
//!
//! Most runtime anomalies (unsupported cells, insufficient drones, dangling
//! prerequisites) degrade gracefully and are only logged. The variants here
//! cover the few inputs that cannot be worked around.

use thiserror::Error;

use crate::grid::GridCoord;
use crate::telemetry::MetricsError;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The RON document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// A field holds a value outside its valid range.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A slot list handed to the driver is not a well-formed graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotGraphError {
    /// Slot ids must equal their index in the list.
    #[error("slot at index {index} carries id {id}")]
    MisalignedId {
        /// Position in the list.
        index: usize,
        /// Id found at that position.
        id: usize,
    },
    /// Two slots occupy the same grid cell.
    #[error("duplicate slot coordinate {0}")]
    DuplicateCoordinate(GridCoord),
}

/// Top-level error for assembly operations.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Malformed slot graph.
    #[error(transparent)]
    SlotGraph(#[from] SlotGraphError),
    /// Telemetry registration or update failure.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}
