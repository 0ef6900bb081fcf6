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

//! # Tessera Data
//!
//! The data model of a swarm assembly: ordered placements, the slot graph and
//! its availability state machine, the drone pool, and the rigid structure
//! transform applied to attached drones.

#![warn(missing_docs)]

pub mod drone;
pub mod placement;
pub mod render;
pub mod slot;
pub mod stats;
pub mod structure;

pub use drone::{Drone, DroneId, DroneState, VisualState};
pub use placement::{GridFrame, OrderedPlacement, Resolution};
pub use slot::{Slot, SlotGraph, SlotId, SlotState, SupportKind};
pub use render::render_layers;
pub use stats::AssemblyStats;
pub use structure::StructureTransform;
