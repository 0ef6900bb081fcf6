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

//! Task allocation: free drones claim available slots.
//!
//! Both strategies share one selection rule: the nearest `Available` slot not
//! yet claimed by any drone, ties broken by the lower slot id. The claimed set
//! is rebuilt from the drone pool at the start of each pass and grows as
//! claims are made, so a slot is never claimed twice.

mod centralized;
mod decentralized;

pub use centralized::CentralizedAllocationLane;
pub use decentralized::DecentralizedAllocationLane;

use std::collections::HashSet;

use tessera_core::lane::Lane;
use tessera_core::math::Vec3;
use tessera_data::{Drone, SlotGraph, SlotId, SlotState, StructureTransform};

/// A lane that hands slots to free drones.
pub trait AllocationLane: Lane {
    /// Runs one assignment pass for `tick`; returns the number of new claims.
    fn assign(
        &self,
        graph: &SlotGraph,
        drones: &mut [Drone],
        transform: &StructureTransform,
        tick: u64,
    ) -> usize;
}

/// Nearest available slot to `from` that is not in `claimed`.
pub fn nearest_unclaimed(
    graph: &SlotGraph,
    claimed: &HashSet<SlotId>,
    transform: &StructureTransform,
    from: Vec3,
) -> Option<SlotId> {
    let mut best: Option<(f32, SlotId)> = None;
    for slot in graph.in_state(SlotState::Available) {
        if claimed.contains(&slot.id) || slot.is_unreachable() {
            continue;
        }
        let d = from.distance_squared(transform.apply(slot.position));
        // Slots are visited in id order, so strict `<` keeps the lower id on ties.
        if best.is_none_or(|(best_d, _)| d < best_d) {
            best = Some((d, slot.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Claims the nearest free slot for `drone`, recording it in `claimed`.
pub(crate) fn claim_nearest(
    graph: &SlotGraph,
    claimed: &mut HashSet<SlotId>,
    transform: &StructureTransform,
    drone: &mut Drone,
) -> bool {
    match nearest_unclaimed(graph, claimed, transform, drone.position) {
        Some(id) => {
            claimed.insert(id);
            drone.claim(id);
            log::trace!("Drone {} claimed slot {}", drone.id, id);
            true
        }
        None => false,
    }
}
