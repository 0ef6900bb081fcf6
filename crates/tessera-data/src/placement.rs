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

//! Ordered placements and the grid-to-world frame.

use serde::{Deserialize, Serialize};
use tessera_core::math::Vec3;
use tessera_core::GridCoord;

/// A placement with its position in the build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedPlacement {
    /// The cell to fill.
    pub coord: GridCoord,
    /// Monotonic build index, starting at 0.
    pub index: usize,
}

/// Output of the support-order resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Placements in build order; `ordered[i].index == i`.
    pub ordered: Vec<OrderedPlacement>,
    /// Cells removed because no support path exists.
    pub dropped: Vec<GridCoord>,
    /// Cells placed without support by the lowest-layer fallback.
    pub relaxed: Vec<GridCoord>,
}

impl Resolution {
    /// Coordinates in build order.
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.ordered.iter().map(|p| p.coord)
    }
}

/// Maps grid cells to world-space positions.
///
/// `world = (coord - grid_center) * cell_size + ground_offset`, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFrame {
    /// Edge length of one cube.
    pub cell_size: f32,
    /// Grid-space point mapped to the world origin (before the ground offset).
    pub grid_center: Vec3,
    /// Constant world-space offset.
    pub ground_offset: Vec3,
}

impl Default for GridFrame {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            grid_center: Vec3::ZERO,
            ground_offset: Vec3::ZERO,
        }
    }
}

impl GridFrame {
    /// Creates a frame from its three parameters.
    pub fn new(cell_size: f32, grid_center: Vec3, ground_offset: Vec3) -> Self {
        Self {
            cell_size,
            grid_center,
            ground_offset,
        }
    }

    /// A frame whose centre is the x/z bounding-box centre of `coords` (y stays 0).
    pub fn centered_on<'a>(
        coords: impl IntoIterator<Item = &'a GridCoord>,
        cell_size: f32,
        ground_offset: Vec3,
    ) -> Self {
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for c in coords {
            bounds = Some(match bounds {
                None => (c.x, c.x, c.z, c.z),
                Some((min_x, max_x, min_z, max_z)) => {
                    (min_x.min(c.x), max_x.max(c.x), min_z.min(c.z), max_z.max(c.z))
                }
            });
        }
        let grid_center = bounds
            .map(|(min_x, max_x, min_z, max_z)| {
                Vec3::new(
                    (min_x + max_x) as f32 * 0.5,
                    0.0,
                    (min_z + max_z) as f32 * 0.5,
                )
            })
            .unwrap_or(Vec3::ZERO);
        Self::new(cell_size, grid_center, ground_offset)
    }

    /// World-space centre of a cell.
    pub fn to_world(&self, coord: GridCoord) -> Vec3 {
        Vec3::new(
            (coord.x as f32 - self.grid_center.x) * self.cell_size,
            (coord.y as f32 - self.grid_center.y) * self.cell_size,
            (coord.z as f32 - self.grid_center.z) * self.cell_size,
        ) + self.ground_offset
    }

    /// The `(x, z)` grid column containing a world-space point.
    pub fn column_of(&self, world: Vec3) -> (i32, i32) {
        let local = world - self.ground_offset;
        (
            (local.x / self.cell_size + self.grid_center.x).round() as i32,
            (local.z / self.cell_size + self.grid_center.z).round() as i32,
        )
    }
}
