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

//! # Tessera Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! shared by every part of the swarm assembly workspace: math primitives,
//! grid coordinates, the physics provider contract, the lane contract,
//! configuration and telemetry types.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod grid;
pub mod lane;
pub mod math;
pub mod physics;
pub mod telemetry;

pub use config::{AllocationStrategy, AssemblyConfig, IslandPolicy};
pub use error::{AssemblyError, ConfigError};
pub use grid::GridCoord;
