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

//! Per-drone polling of the shared slot state.

use tessera_core::lane::{Lane, LaneKind, LaneWorkload};
use tessera_data::{drone::claimed_slots, Drone, DroneId, SlotGraph, StructureTransform};

use super::{claim_nearest, AllocationLane};

/// Each free drone re-evaluates only on its own throttled schedule.
///
/// Drone `i` decides on ticks where `(tick + i) % interval == 0`, which
/// staggers decisions across the pool. Decisions within a tick see the claims
/// made earlier in the same tick.
#[derive(Debug, Clone, Copy)]
pub struct DecentralizedAllocationLane {
    interval: u32,
}

impl Default for DecentralizedAllocationLane {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DecentralizedAllocationLane {
    /// Creates a lane where each drone decides every `interval` ticks.
    /// An interval of `0` is treated as `1`.
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    /// Ticks between two decisions of the same drone.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// `true` if `drone` gets to decide on `tick`.
    pub fn decides_on(&self, drone: DroneId, tick: u64) -> bool {
        (tick + drone as u64) % u64::from(self.interval) == 0
    }
}

impl Lane for DecentralizedAllocationLane {
    fn strategy_name(&self) -> &'static str {
        "Decentralized"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Allocation
    }

    fn estimate_cost(&self, workload: &LaneWorkload) -> f32 {
        let deciders = workload.drones.saturating_sub(workload.movers) as f32 / self.interval as f32;
        deciders * workload.slots as f32
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AllocationLane for DecentralizedAllocationLane {
    fn assign(
        &self,
        graph: &SlotGraph,
        drones: &mut [Drone],
        transform: &StructureTransform,
        tick: u64,
    ) -> usize {
        let mut claimed = claimed_slots(drones);
        let mut claims = 0;
        for drone in drones.iter_mut() {
            if !drone.is_free() || !self.decides_on(drone.id, tick) {
                continue;
            }
            if claim_nearest(graph, &mut claimed, transform, drone) {
                claims += 1;
            }
        }
        claims
    }
}
