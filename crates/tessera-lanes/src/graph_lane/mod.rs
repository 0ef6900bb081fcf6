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

//! Slot graph construction from a build order.

use std::collections::HashMap;

use tessera_core::error::SlotGraphError;
use tessera_core::lane::{Lane, LaneKind, LaneWorkload};
use tessera_core::GridCoord;
use tessera_data::{GridFrame, OrderedPlacement, Slot, SlotGraph, SlotId, SupportKind};

/// A lane that turns ordered placements into a slot graph.
pub trait GraphLane: Lane {
    /// Builds one slot per placement, positioned through `frame`.
    fn build(
        &self,
        ordered: &[OrderedPlacement],
        frame: GridFrame,
    ) -> Result<SlotGraph, SlotGraphError>;
}

/// Derives prerequisites from vertical support first, then lateral support.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlotGraphLane;

impl SlotGraphLane {
    /// Creates a new `SlotGraphLane`.
    pub fn new() -> Self {
        Self
    }

    fn support_of(
        coord: GridCoord,
        id: SlotId,
        index: &HashMap<GridCoord, SlotId>,
    ) -> (SupportKind, Vec<SlotId>) {
        if coord.is_ground() {
            return (SupportKind::Ground, Vec::new());
        }
        if let Some(&below) = index.get(&coord.below()) {
            return (SupportKind::Vertical, vec![below]);
        }
        let lateral: Vec<SlotId> = coord
            .lateral_neighbors()
            .iter()
            .filter_map(|n| index.get(n).copied())
            .filter(|&n| n < id)
            .collect();
        if lateral.is_empty() {
            (SupportKind::Unsupported, Vec::new())
        } else {
            (SupportKind::Lateral, lateral)
        }
    }
}

impl Lane for SlotGraphLane {
    fn strategy_name(&self) -> &'static str {
        "SlotGraph"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Graph
    }

    fn estimate_cost(&self, workload: &LaneWorkload) -> f32 {
        workload.slots as f32
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl GraphLane for SlotGraphLane {
    fn build(
        &self,
        ordered: &[OrderedPlacement],
        frame: GridFrame,
    ) -> Result<SlotGraph, SlotGraphError> {
        // Slot ids follow list position; duplicates are rejected by the graph.
        let mut index = HashMap::with_capacity(ordered.len());
        for (id, placement) in ordered.iter().enumerate() {
            index.entry(placement.coord).or_insert(id);
        }

        let slots = ordered
            .iter()
            .enumerate()
            .map(|(id, placement)| {
                let (support, prerequisites) = Self::support_of(placement.coord, id, &index);
                Slot::new(
                    id,
                    placement.coord,
                    frame.to_world(placement.coord),
                    support,
                    prerequisites,
                )
            })
            .collect();

        let graph = SlotGraph::new(slots, frame)?;
        log::debug!(
            "Built slot graph with {} slot(s), {} initially available",
            graph.len(),
            graph.count(tessera_data::SlotState::Available)
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::math::Vec3;
    use tessera_data::SlotState;

    fn ordered(coords: &[GridCoord]) -> Vec<OrderedPlacement> {
        coords
            .iter()
            .enumerate()
            .map(|(index, &coord)| OrderedPlacement { coord, index })
            .collect()
    }

    #[test]
    fn test_vertical_support_wins_over_lateral() {
        let cells = [
            GridCoord::new(0, 0, 0),
            GridCoord::new(1, 0, 0),
            GridCoord::new(0, 1, 0),
            GridCoord::new(1, 1, 0),
        ];
        let graph = SlotGraphLane::new().build(&ordered(&cells), GridFrame::default()).unwrap();
        let top = graph.get(3).unwrap();
        assert_eq!(top.support, SupportKind::Vertical);
        assert_eq!(top.prerequisites, vec![1]);
    }

    #[test]
    fn test_lateral_only_counts_earlier_neighbours() {
        let cells = [
            GridCoord::new(0, 0, 0),
            GridCoord::new(0, 1, 0),
            GridCoord::new(1, 1, 0),
            GridCoord::new(2, 1, 0),
        ];
        let graph = SlotGraphLane::new().build(&ordered(&cells), GridFrame::default()).unwrap();
        let middle = graph.get(2).unwrap();
        assert_eq!(middle.support, SupportKind::Lateral);
        assert_eq!(middle.prerequisites, vec![1]);
        assert_eq!(graph.get(3).unwrap().prerequisites, vec![2]);
    }

    #[test]
    fn test_floating_slot_is_unreachable() {
        let cells = [GridCoord::new(0, 0, 0), GridCoord::new(4, 2, 4)];
        let graph = SlotGraphLane::new().build(&ordered(&cells), GridFrame::default()).unwrap();
        let floating = graph.get(1).unwrap();
        assert_eq!(floating.support, SupportKind::Unsupported);
        assert_eq!(floating.state, SlotState::Locked);
        assert_eq!(graph.unreachable().count(), 1);
    }

    #[test]
    fn test_positions_follow_frame() {
        let frame = GridFrame::new(2.0, Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0));
        let cells = [GridCoord::new(1, 0, 1), GridCoord::new(1, 1, 1)];
        let graph = SlotGraphLane::new().build(&ordered(&cells), frame).unwrap();
        assert_eq!(graph.get(0).unwrap().position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(graph.get(1).unwrap().position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(graph.frame(), &frame);
    }

    #[test]
    fn test_duplicate_coordinates_are_rejected() {
        let cell = GridCoord::new(0, 0, 0);
        let err = SlotGraphLane::new().build(&ordered(&[cell, cell]), GridFrame::default());
        assert_eq!(err.unwrap_err(), SlotGraphError::DuplicateCoordinate(cell));
    }
}
