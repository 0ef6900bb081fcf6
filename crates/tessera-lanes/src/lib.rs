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

//! # Tessera Lanes
//!
//! Hot-path strategies of the assembly pipeline. Each lane implements the
//! [`Lane`](tessera_core::lane::Lane) identity trait plus one domain trait:
//!
//! - [`OrderingLane`]: placements to a support-respecting build order.
//! - [`GraphLane`]: build order to a positioned slot graph.
//! - [`AllocationLane`]: free drones claim available slots.
//! - [`SteeringLane`]: desired velocity per drone.
//! - [`MotionLane`]: integrates desired velocities into positions.

#![warn(missing_docs)]

pub mod allocation_lane;
pub mod graph_lane;
pub mod motion_lane;
pub mod order_lane;
pub mod steering_lane;

pub use allocation_lane::{AllocationLane, CentralizedAllocationLane, DecentralizedAllocationLane};
pub use graph_lane::{GraphLane, SlotGraphLane};
pub use motion_lane::{KinematicMotionLane, MotionContext, MotionLane, PhysicsMotionLane};
pub use order_lane::{OrderingLane, SupportOrderLane};
pub use steering_lane::{SpatialHash, SteeringContext, SteeringLane, SteeringOutput, SwarmSteeringLane};
