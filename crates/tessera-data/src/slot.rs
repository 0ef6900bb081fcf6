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

//! The slot graph and its availability state machine.
//!
//! A slot is a positioned, prerequisite-gated placeholder for one cube. Its
//! state only ever advances `Locked -> Available -> Filled`. Availability is
//! derived from the prerequisite rule of the slot's [`SupportKind`]:
//!
//! | Support       | Prerequisites                      | Satisfied when       |
//! |---------------|------------------------------------|----------------------|
//! | `Ground`      | none                               | always               |
//! | `Vertical`    | the slot directly below            | all are filled       |
//! | `Lateral`     | earlier same-level neighbours      | any one is filled    |
//! | `Unsupported` | none                               | never                |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_core::error::SlotGraphError;
use tessera_core::math::{Quaternion, Vec3};
use tessera_core::GridCoord;

use crate::placement::GridFrame;

/// Identifier of a slot; equal to its placement index.
pub type SlotId = usize;

/// Lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotState {
    /// Prerequisites not yet satisfied.
    Locked,
    /// Ready to be claimed and filled.
    Available,
    /// Permanently occupied by a drone.
    Filled,
}

/// How a slot is held up, which also selects its prerequisite semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportKind {
    /// On the ground layer; no prerequisites.
    Ground,
    /// Rests on the slot below (AND semantics).
    Vertical,
    /// Hangs off earlier same-level neighbours (OR semantics).
    Lateral,
    /// Above ground with no support at all; never becomes available.
    Unsupported,
}

/// A placement slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Equal to the placement index and to the slot's position in its graph.
    pub id: SlotId,
    /// Source grid cell.
    pub coord: GridCoord,
    /// World-space target position of the drone that fills this slot.
    pub position: Vec3,
    /// World-space target orientation.
    pub orientation: Quaternion,
    /// Slots gating this one; semantics depend on `support`.
    pub prerequisites: Vec<SlotId>,
    /// Prerequisite semantics.
    pub support: SupportKind,
    /// Source level (`coord.y`).
    pub level: i32,
    /// Current lifecycle state.
    pub state: SlotState,
    /// Rests only on slots that can never be filled.
    #[serde(skip)]
    stranded: bool,
}

impl Slot {
    /// Creates a locked slot.
    pub fn new(
        id: SlotId,
        coord: GridCoord,
        position: Vec3,
        support: SupportKind,
        prerequisites: Vec<SlotId>,
    ) -> Self {
        Self {
            id,
            coord,
            position,
            orientation: Quaternion::IDENTITY,
            prerequisites,
            support,
            level: coord.y,
            state: SlotState::Locked,
            stranded: false,
        }
    }

    /// `true` if the slot can never become available.
    ///
    /// Covers unsupported slots and, once inside a [`SlotGraph`], every slot
    /// whose prerequisite rule can only be met through such slots.
    pub fn is_unreachable(&self) -> bool {
        self.support == SupportKind::Unsupported || self.stranded
    }
}

/// Index-aligned slot list with a coordinate index and a surface height map.
#[derive(Debug, Clone, Default)]
pub struct SlotGraph {
    slots: Vec<Slot>,
    by_coord: HashMap<GridCoord, SlotId>,
    frame: GridFrame,
    /// Top world height of filled geometry per `(x, z)` column.
    surface: HashMap<(i32, i32), f32>,
}

impl SlotGraph {
    /// Wraps a slot list, validating ids and coordinates, then derives
    /// the initial availability.
    ///
    /// Slots already marked `Filled` keep that state and feed the surface map.
    pub fn new(slots: Vec<Slot>, frame: GridFrame) -> Result<Self, SlotGraphError> {
        let mut by_coord = HashMap::with_capacity(slots.len());
        for (index, slot) in slots.iter().enumerate() {
            if slot.id != index {
                return Err(SlotGraphError::MisalignedId { index, id: slot.id });
            }
            if by_coord.insert(slot.coord, slot.id).is_some() {
                return Err(SlotGraphError::DuplicateCoordinate(slot.coord));
            }
        }

        let mut graph = Self {
            slots,
            by_coord,
            frame,
            surface: HashMap::new(),
        };
        let filled: Vec<SlotId> = graph
            .slots
            .iter()
            .filter(|s| s.state == SlotState::Filled)
            .map(|s| s.id)
            .collect();
        for id in filled {
            graph.raise_surface(id);
        }
        graph.mark_stranded();
        graph.refresh_availability();

        let unreachable = graph.unreachable().count();
        if unreachable > 0 {
            log::warn!(
                "Slot graph holds {} unreachable slot(s); they will never be assigned",
                unreachable
            );
        }
        Ok(graph)
    }

    /// An empty graph.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` if the graph has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot with the given id.
    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// All slots, index-aligned.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The grid-to-world frame the slots were positioned with.
    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// The slot occupying a grid cell.
    pub fn slot_at(&self, coord: GridCoord) -> Option<&Slot> {
        self.by_coord.get(&coord).and_then(|&id| self.slots.get(id))
    }

    /// Slots currently in `state`.
    pub fn in_state(&self, state: SlotState) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter().filter(move |s| s.state == state)
    }

    /// Number of slots currently in `state`.
    pub fn count(&self, state: SlotState) -> usize {
        self.in_state(state).count()
    }

    /// Slots that can never become available.
    pub fn unreachable(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter().filter(|s| s.is_unreachable())
    }

    /// `true` once no reachable slot remains unfilled.
    pub fn is_complete(&self) -> bool {
        self.slots
            .iter()
            .all(|s| s.state == SlotState::Filled || s.is_unreachable())
    }

    /// Propagates unreachability to a fixpoint, so id order does not matter.
    fn mark_stranded(&mut self) {
        loop {
            let stranded: Vec<SlotId> = self
                .slots
                .iter()
                .filter(|s| s.state != SlotState::Filled && !s.is_unreachable())
                .filter(|s| self.never_satisfiable(s))
                .map(|s| s.id)
                .collect();
            if stranded.is_empty() {
                break;
            }
            for id in stranded {
                self.slots[id].stranded = true;
            }
        }
    }

    fn never_satisfiable(&self, slot: &Slot) -> bool {
        let dead = |id: SlotId| {
            self.slots
                .get(id)
                .is_none_or(|p| p.state != SlotState::Filled && p.is_unreachable())
        };
        match slot.support {
            SupportKind::Ground | SupportKind::Vertical => {
                slot.prerequisites.iter().any(|&p| dead(p))
            }
            SupportKind::Lateral => slot.prerequisites.iter().all(|&p| dead(p)),
            SupportKind::Unsupported => true,
        }
    }

    fn is_filled(&self, id: SlotId) -> bool {
        // Dangling ids never count as filled.
        self.slots
            .get(id)
            .is_some_and(|s| s.state == SlotState::Filled)
    }

    /// Evaluates the prerequisite rule of a slot against the current states.
    pub fn prerequisites_satisfied(&self, id: SlotId) -> bool {
        let Some(slot) = self.slots.get(id) else {
            return false;
        };
        match slot.support {
            SupportKind::Ground | SupportKind::Vertical => {
                slot.prerequisites.iter().all(|&p| self.is_filled(p))
            }
            SupportKind::Lateral => slot.prerequisites.iter().any(|&p| self.is_filled(p)),
            SupportKind::Unsupported => false,
        }
    }

    /// Promotes every locked slot whose prerequisites are satisfied.
    ///
    /// Pure with respect to everything but slot states, and idempotent.
    /// Returns the number of promoted slots.
    pub fn refresh_availability(&mut self) -> usize {
        let promoted: Vec<SlotId> = self
            .slots
            .iter()
            .filter(|s| s.state == SlotState::Locked)
            .map(|s| s.id)
            .filter(|&id| self.prerequisites_satisfied(id))
            .collect();
        for &id in &promoted {
            self.slots[id].state = SlotState::Available;
        }
        if !promoted.is_empty() {
            log::trace!("Promoted {} slot(s) to available", promoted.len());
        }
        promoted.len()
    }

    /// Marks an available slot as filled and refreshes availability.
    ///
    /// Returns `false` (and changes nothing) if the slot is not `Available`.
    pub fn fill(&mut self, id: SlotId) -> bool {
        match self.slots.get_mut(id) {
            Some(slot) if slot.state == SlotState::Available => {
                slot.state = SlotState::Filled;
            }
            _ => return false,
        }
        self.raise_surface(id);
        self.refresh_availability();
        true
    }

    fn raise_surface(&mut self, id: SlotId) {
        let slot = &self.slots[id];
        let top = slot.position.y + self.frame.cell_size * 0.5;
        let column = (slot.coord.x, slot.coord.z);
        let entry = self.surface.entry(column).or_insert(top);
        if top > *entry {
            *entry = top;
        }
    }

    /// Highest filled surface in the 3x3 block of columns around `world`.
    pub fn surface_height_near(&self, world: Vec3) -> Option<f32> {
        let (cx, cz) = self.frame.column_of(world);
        let mut best: Option<f32> = None;
        for dx in -1..=1 {
            for dz in -1..=1 {
                if let Some(&h) = self.surface.get(&(cx + dx, cz + dz)) {
                    best = Some(best.map_or(h, |b: f32| b.max(h)));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> SlotGraph {
        let frame = GridFrame::default();
        let coords = [
            GridCoord::new(5, 0, 5),
            GridCoord::new(5, 1, 5),
            GridCoord::new(5, 2, 5),
        ];
        let slots = vec![
            Slot::new(0, coords[0], frame.to_world(coords[0]), SupportKind::Ground, vec![]),
            Slot::new(1, coords[1], frame.to_world(coords[1]), SupportKind::Vertical, vec![0]),
            Slot::new(2, coords[2], frame.to_world(coords[2]), SupportKind::Vertical, vec![1]),
        ];
        SlotGraph::new(slots, frame).unwrap()
    }

    #[test]
    fn test_column_unlocks_bottom_up() {
        let mut graph = column();
        assert_eq!(graph.get(0).unwrap().state, SlotState::Available);
        assert_eq!(graph.get(1).unwrap().state, SlotState::Locked);

        assert!(graph.fill(0));
        assert_eq!(graph.get(1).unwrap().state, SlotState::Available);
        assert_eq!(graph.get(2).unwrap().state, SlotState::Locked);

        assert!(graph.fill(1));
        assert_eq!(graph.get(2).unwrap().state, SlotState::Available);
    }

    #[test]
    fn test_fill_rejects_locked_and_filled_slots() {
        let mut graph = column();
        assert!(!graph.fill(2));
        assert!(graph.fill(0));
        assert!(!graph.fill(0));
        assert!(!graph.fill(99));
        assert_eq!(graph.count(SlotState::Filled), 1);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut graph = column();
        assert_eq!(graph.refresh_availability(), 0);
        let before: Vec<SlotState> = graph.slots().iter().map(|s| s.state).collect();
        graph.refresh_availability();
        let after: Vec<SlotState> = graph.slots().iter().map(|s| s.state).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_lateral_any_neighbour_suffices() {
        let frame = GridFrame::default();
        let a = GridCoord::new(0, 0, 0);
        let b = GridCoord::new(2, 0, 0);
        let bridge = GridCoord::new(1, 0, 0);
        let slots = vec![
            Slot::new(0, a, frame.to_world(a), SupportKind::Ground, vec![]),
            Slot::new(1, b, frame.to_world(b), SupportKind::Ground, vec![]),
            Slot::new(2, bridge, frame.to_world(bridge), SupportKind::Lateral, vec![0, 1]),
        ];
        let mut graph = SlotGraph::new(slots, frame).unwrap();
        assert_eq!(graph.get(2).unwrap().state, SlotState::Locked);
        graph.fill(1);
        assert_eq!(graph.get(2).unwrap().state, SlotState::Available);
    }

    #[test]
    fn test_dangling_prerequisite_only_blocks_its_slot() {
        let frame = GridFrame::default();
        let a = GridCoord::new(0, 0, 0);
        let b = GridCoord::new(0, 1, 0);
        let c = GridCoord::new(3, 0, 0);
        let slots = vec![
            Slot::new(0, a, frame.to_world(a), SupportKind::Ground, vec![]),
            Slot::new(1, b, frame.to_world(b), SupportKind::Vertical, vec![42]),
            Slot::new(2, c, frame.to_world(c), SupportKind::Ground, vec![]),
        ];
        let mut graph = SlotGraph::new(slots, frame).unwrap();
        assert!(graph.get(1).unwrap().is_unreachable());
        graph.fill(0);
        assert_eq!(graph.get(1).unwrap().state, SlotState::Locked);
        assert_eq!(graph.get(2).unwrap().state, SlotState::Available);
    }

    #[test]
    fn test_slots_resting_on_unsupported_are_unreachable() {
        let frame = GridFrame::default();
        let ground = GridCoord::new(0, 0, 0);
        let floating = GridCoord::new(4, 2, 4);
        let above = GridCoord::new(4, 3, 4);
        let beside = GridCoord::new(5, 2, 4);
        let bridged = GridCoord::new(1, 0, 0);
        // Ids deliberately out of dependency order.
        let slots = vec![
            Slot::new(0, above, frame.to_world(above), SupportKind::Vertical, vec![2]),
            Slot::new(1, beside, frame.to_world(beside), SupportKind::Lateral, vec![2]),
            Slot::new(2, floating, frame.to_world(floating), SupportKind::Unsupported, vec![]),
            Slot::new(3, ground, frame.to_world(ground), SupportKind::Ground, vec![]),
            Slot::new(4, bridged, frame.to_world(bridged), SupportKind::Lateral, vec![2, 3]),
        ];
        let mut graph = SlotGraph::new(slots, frame).unwrap();
        let unreachable: Vec<SlotId> = graph.unreachable().map(|s| s.id).collect();
        assert_eq!(unreachable, vec![0, 1, 2]);
        assert!(!graph.get(4).unwrap().is_unreachable());

        assert!(!graph.is_complete());
        graph.fill(3);
        graph.fill(4);
        assert!(graph.is_complete());
    }

    #[test]
    fn test_unsupported_slot_stays_locked() {
        let frame = GridFrame::default();
        let floating = GridCoord::new(0, 3, 0);
        let slots = vec![Slot::new(
            0,
            floating,
            frame.to_world(floating),
            SupportKind::Unsupported,
            vec![],
        )];
        let graph = SlotGraph::new(slots, frame).unwrap();
        assert_eq!(graph.get(0).unwrap().state, SlotState::Locked);
        assert_eq!(graph.unreachable().count(), 1);
        assert!(graph.is_complete());
    }

    #[test]
    fn test_validation_rejects_misaligned_and_duplicate_slots() {
        let frame = GridFrame::default();
        let a = GridCoord::new(0, 0, 0);
        let misaligned = vec![Slot::new(3, a, Vec3::ZERO, SupportKind::Ground, vec![])];
        assert_eq!(
            SlotGraph::new(misaligned, frame).unwrap_err(),
            SlotGraphError::MisalignedId { index: 0, id: 3 }
        );

        let duplicate = vec![
            Slot::new(0, a, Vec3::ZERO, SupportKind::Ground, vec![]),
            Slot::new(1, a, Vec3::ZERO, SupportKind::Ground, vec![]),
        ];
        assert_eq!(
            SlotGraph::new(duplicate, frame).unwrap_err(),
            SlotGraphError::DuplicateCoordinate(a)
        );
    }

    #[test]
    fn test_surface_tracks_filled_tops() {
        let mut graph = column();
        let probe = graph.get(2).unwrap().position;
        assert_eq!(graph.surface_height_near(probe), None);
        graph.fill(0);
        graph.fill(1);
        let top = graph.get(1).unwrap().position.y + 0.5;
        assert_eq!(graph.surface_height_near(probe), Some(top));
    }
}
