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

//! Greedy assignment over the whole pool every tick.

use tessera_core::lane::{Lane, LaneKind, LaneWorkload};
use tessera_data::{drone::claimed_slots, Drone, SlotGraph, StructureTransform};

use super::{claim_nearest, AllocationLane};

/// Every free drone, in id order, takes the nearest unclaimed available slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct CentralizedAllocationLane;

impl CentralizedAllocationLane {
    /// Creates a new `CentralizedAllocationLane`.
    pub fn new() -> Self {
        Self
    }
}

impl Lane for CentralizedAllocationLane {
    fn strategy_name(&self) -> &'static str {
        "Centralized"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Allocation
    }

    fn estimate_cost(&self, workload: &LaneWorkload) -> f32 {
        (workload.drones.saturating_sub(workload.movers) * workload.slots) as f32
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AllocationLane for CentralizedAllocationLane {
    fn assign(
        &self,
        graph: &SlotGraph,
        drones: &mut [Drone],
        transform: &StructureTransform,
        _tick: u64,
    ) -> usize {
        let mut claimed = claimed_slots(drones);
        let mut claims = 0;
        for drone in drones.iter_mut().filter(|d| d.is_free()) {
            if !claim_nearest(graph, &mut claimed, transform, drone) {
                break;
            }
            claims += 1;
        }
        claims
    }
}
