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

//! # Lane Abstraction
//!
//! A **Lane** is a reusable, swappable processing strategy owned by an agent.
//! Each lane encapsulates one algorithmic approach to a step of the assembly
//! pipeline (ordering, slot graph construction, task allocation, steering,
//! motion integration).
//!
//! The system follows a two-level trait hierarchy:
//!
//! 1. **`Lane`** (this trait): identity, classification, cost estimation.
//! 2. **Domain traits** extending `Lane` with their execution method, e.g.
//!    `AllocationLane: Lane` or `MotionLane: Lane` in `tessera-lanes`.
//!
//! ```rust,ignore
//! use tessera_core::lane::{Lane, LaneKind, LaneWorkload};
//!
//! struct NearestFirst;
//!
//! impl Lane for NearestFirst {
//!     fn strategy_name(&self) -> &'static str { "NearestFirst" }
//!     fn lane_kind(&self) -> LaneKind { LaneKind::Allocation }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//! }
//! ```

use std::any::Any;
use std::fmt;

/// Classification of lane types, used for routing and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Gravity/support ordering of placements.
    Ordering,
    /// Slot graph construction.
    Graph,
    /// Slot claiming and task allocation.
    Allocation,
    /// Desired-velocity computation (goal seeking, separation, surface following).
    Steering,
    /// Position integration, kinematic or physics driven.
    Motion,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Ordering => write!(f, "Ordering"),
            LaneKind::Graph => write!(f, "Graph"),
            LaneKind::Allocation => write!(f, "Allocation"),
            LaneKind::Steering => write!(f, "Steering"),
            LaneKind::Motion => write!(f, "Motion"),
        }
    }
}

/// Size of the problem a lane is about to process, used for cost estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneWorkload {
    /// Number of slots in the current build.
    pub slots: usize,
    /// Total size of the drone pool.
    pub drones: usize,
    /// Drones currently travelling to a claimed slot.
    pub movers: usize,
}

/// Base trait for ALL lane types.
pub trait Lane: Send + Sync {
    /// Human-readable name identifying this lane's strategy.
    ///
    /// Should be unique within a lane kind (e.g., `"Centralized"`, `"Decentralized"`).
    fn strategy_name(&self) -> &'static str;

    /// The kind of processing this lane performs.
    fn lane_kind(&self) -> LaneKind;

    /// Estimated relative cost of running this lane once for `workload`.
    ///
    /// Default returns `1.0`.
    fn estimate_cost(&self, _workload: &LaneWorkload) -> f32 {
        1.0
    }

    /// Downcast to a concrete type for type-specific operations.
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl Lane for Probe {
        fn strategy_name(&self) -> &'static str {
            "Probe"
        }

        fn lane_kind(&self) -> LaneKind {
            LaneKind::Steering
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_default_cost_and_downcast() {
        let lane: Box<dyn Lane> = Box::new(Probe);
        assert_eq!(lane.estimate_cost(&LaneWorkload::default()), 1.0);
        assert!(lane.as_any().downcast_ref::<Probe>().is_some());
        assert_eq!(lane.lane_kind().to_string(), "Steering");
    }
}
