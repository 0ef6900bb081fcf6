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

//! Aggregate counts over slots and drones.

use serde::{Deserialize, Serialize};

use crate::drone::{Drone, DroneState};
use crate::slot::{SlotGraph, SlotState};

/// Snapshot of drone and slot counts for display and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Drones holding in the hub.
    pub drones_parking: usize,
    /// Drones travelling to a slot.
    pub drones_moving: usize,
    /// Drones locked into the structure.
    pub drones_attached: usize,
    /// Slots waiting on prerequisites (unreachable ones included).
    pub slots_locked: usize,
    /// Slots ready to be claimed.
    pub slots_available: usize,
    /// Slots occupied.
    pub slots_filled: usize,
    /// Slots that can never become available.
    pub slots_unreachable: usize,
    /// Filled share of the reachable slots; `0.0` when there are none.
    pub fraction_complete: f32,
}

impl AssemblyStats {
    /// Counts states across a graph and a drone pool.
    pub fn collect(graph: &SlotGraph, drones: &[Drone]) -> Self {
        let mut stats = Self::default();
        for drone in drones {
            match drone.state {
                DroneState::Parking => stats.drones_parking += 1,
                DroneState::MovingToSlot => stats.drones_moving += 1,
                DroneState::Attached => stats.drones_attached += 1,
            }
        }
        for slot in graph.slots() {
            match slot.state {
                SlotState::Locked => stats.slots_locked += 1,
                SlotState::Available => stats.slots_available += 1,
                SlotState::Filled => stats.slots_filled += 1,
            }
            if slot.is_unreachable() {
                stats.slots_unreachable += 1;
            }
        }
        let reachable = graph.len() - stats.slots_unreachable;
        if reachable > 0 {
            stats.fraction_complete = stats.slots_filled as f32 / reachable as f32;
        }
        stats
    }

    /// Total number of slots.
    pub fn slot_total(&self) -> usize {
        self.slots_locked + self.slots_available + self.slots_filled
    }

    /// Total number of drones.
    pub fn drone_total(&self) -> usize {
        self.drones_parking + self.drones_moving + self.drones_attached
    }
}
