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

//! Support ordering of raw placements.

use std::collections::{BTreeSet, HashSet};

use tessera_core::lane::{Lane, LaneKind, LaneWorkload};
use tessera_core::{GridCoord, IslandPolicy};
use tessera_data::{OrderedPlacement, Resolution};

/// A lane that turns an unordered placement list into a build order.
pub trait OrderingLane: Lane {
    /// Orders `placements`, assigning indices `0..n`.
    fn resolve(&self, placements: &[GridCoord]) -> Resolution;
}

/// Frontier-expansion resolver.
///
/// A cell is eligible once it sits on the ground, on a placed cell, or next to
/// a placed cell on the same level. Every round places the whole eligible
/// frontier sorted by `(y, x, z)`, so identical input always yields identical
/// output. When a round comes up empty, the remaining cells are handled by the
/// configured [`IslandPolicy`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SupportOrderLane {
    policy: IslandPolicy,
}

impl SupportOrderLane {
    /// Creates a resolver with the given island policy.
    pub fn new(policy: IslandPolicy) -> Self {
        Self { policy }
    }

    /// The island policy in effect.
    pub fn policy(&self) -> IslandPolicy {
        self.policy
    }

    fn is_eligible(cell: &GridCoord, placed: &HashSet<GridCoord>) -> bool {
        cell.is_ground()
            || placed.contains(&cell.below())
            || cell.lateral_neighbors().iter().any(|n| placed.contains(n))
    }

    fn place_round(
        mut round: Vec<GridCoord>,
        remaining: &mut BTreeSet<GridCoord>,
        placed: &mut HashSet<GridCoord>,
        ordered: &mut Vec<OrderedPlacement>,
    ) {
        round.sort_by_key(GridCoord::level_key);
        for coord in round {
            remaining.remove(&coord);
            placed.insert(coord);
            ordered.push(OrderedPlacement {
                coord,
                index: ordered.len(),
            });
        }
    }
}

impl Lane for SupportOrderLane {
    fn strategy_name(&self) -> &'static str {
        "SupportOrder"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Ordering
    }

    fn estimate_cost(&self, workload: &LaneWorkload) -> f32 {
        workload.slots as f32
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl OrderingLane for SupportOrderLane {
    fn resolve(&self, placements: &[GridCoord]) -> Resolution {
        let mut remaining: BTreeSet<GridCoord> = placements.iter().copied().collect();
        let duplicates = placements.len() - remaining.len();
        if duplicates > 0 {
            log::debug!("Ignoring {} duplicate placement(s)", duplicates);
        }

        let mut placed = HashSet::with_capacity(remaining.len());
        let mut resolution = Resolution {
            ordered: Vec::with_capacity(remaining.len()),
            ..Default::default()
        };
        let mut rounds = 0usize;

        while !remaining.is_empty() {
            let frontier: Vec<GridCoord> = remaining
                .iter()
                .filter(|c| Self::is_eligible(c, &placed))
                .copied()
                .collect();

            if !frontier.is_empty() {
                rounds += 1;
                Self::place_round(frontier, &mut remaining, &mut placed, &mut resolution.ordered);
                continue;
            }

            // Stalled: nothing left has a support path through placed cells.
            match self.policy {
                IslandPolicy::Drop => {
                    for coord in &remaining {
                        log::warn!("Dropping unsupported placement {}", coord);
                    }
                    resolution.dropped.extend(remaining.iter().copied());
                    remaining.clear();
                }
                IslandPolicy::PlaceLowestLayer => {
                    let Some(lowest) = remaining.iter().map(|c| c.y).min() else {
                        break;
                    };
                    let layer: Vec<GridCoord> =
                        remaining.iter().filter(|c| c.y == lowest).copied().collect();
                    log::warn!(
                        "Support expansion stalled with {} cell(s) left; placing {} unsupported cell(s) at level {}",
                        remaining.len(),
                        layer.len(),
                        lowest
                    );
                    resolution.relaxed.extend(layer.iter().copied());
                    rounds += 1;
                    Self::place_round(layer, &mut remaining, &mut placed, &mut resolution.ordered);
                }
            }
        }

        log::debug!(
            "Resolved {} placement(s) in {} round(s), {} dropped, {} relaxed",
            resolution.ordered.len(),
            rounds,
            resolution.dropped.len(),
            resolution.relaxed.len()
        );
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(resolution: &Resolution) -> Vec<GridCoord> {
        resolution.coords().collect()
    }

    #[test]
    fn test_column_orders_by_level() {
        let input = [
            GridCoord::new(5, 2, 5),
            GridCoord::new(5, 0, 5),
            GridCoord::new(5, 1, 5),
        ];
        let resolution = SupportOrderLane::default().resolve(&input);
        assert_eq!(
            coords(&resolution),
            vec![
                GridCoord::new(5, 0, 5),
                GridCoord::new(5, 1, 5),
                GridCoord::new(5, 2, 5)
            ]
        );
        assert!(resolution
            .ordered
            .iter()
            .enumerate()
            .all(|(i, p)| p.index == i));
    }

    #[test]
    fn test_duplicates_collapse() {
        let cell = GridCoord::new(1, 0, 1);
        let resolution = SupportOrderLane::default().resolve(&[cell, cell, cell]);
        assert_eq!(coords(&resolution), vec![cell]);
    }

    #[test]
    fn test_cantilever_grows_sideways() {
        let input = [
            GridCoord::new(0, 0, 0),
            GridCoord::new(0, 1, 0),
            GridCoord::new(1, 1, 0),
            GridCoord::new(2, 1, 0),
        ];
        let resolution = SupportOrderLane::default().resolve(&input);
        assert_eq!(coords(&resolution), input.to_vec());
        assert!(resolution.dropped.is_empty());
    }

    #[test]
    fn test_floating_cell_is_dropped() {
        let floating = GridCoord::new(3, 4, 3);
        let resolution = SupportOrderLane::default().resolve(&[GridCoord::new(0, 0, 0), floating]);
        assert_eq!(coords(&resolution), vec![GridCoord::new(0, 0, 0)]);
        assert_eq!(resolution.dropped, vec![floating]);
    }

    #[test]
    fn test_lowest_layer_fallback_places_islands() {
        let island = [
            GridCoord::new(9, 3, 9),
            GridCoord::new(9, 4, 9),
            GridCoord::new(8, 3, 9),
        ];
        let resolution = SupportOrderLane::new(IslandPolicy::PlaceLowestLayer).resolve(&island);
        assert_eq!(
            coords(&resolution),
            vec![
                GridCoord::new(8, 3, 9),
                GridCoord::new(9, 3, 9),
                GridCoord::new(9, 4, 9)
            ]
        );
        assert_eq!(resolution.relaxed.len(), 2);
        assert!(resolution.dropped.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let resolution = SupportOrderLane::default().resolve(&[]);
        assert!(resolution.ordered.is_empty());
        assert!(resolution.dropped.is_empty());
    }
}
