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

//! Integer grid coordinates for unit-cube placements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer cell on the build grid. One cell holds exactly one cube.
///
/// `y` is the vertical level; `y == 0` is the ground layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    /// Column along the X axis.
    pub x: i32,
    /// Vertical level.
    pub y: i32,
    /// Column along the Z axis.
    pub z: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` for cells on the ground layer.
    #[inline]
    pub const fn is_ground(&self) -> bool {
        self.y == 0
    }

    /// The cell directly beneath this one.
    #[inline]
    pub const fn below(&self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    /// The four same-level neighbours, in `+x, -x, +z, -z` order.
    #[inline]
    pub const fn lateral_neighbors(&self) -> [Self; 4] {
        [
            Self::new(self.x + 1, self.y, self.z),
            Self::new(self.x - 1, self.y, self.z),
            Self::new(self.x, self.y, self.z + 1),
            Self::new(self.x, self.y, self.z - 1),
        ]
    }

    /// Deterministic build-order key: level first, then x, then z.
    #[inline]
    pub const fn level_key(&self) -> (i32, i32, i32) {
        (self.y, self.x, self.z)
    }
}

impl From<(i32, i32, i32)> for GridCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours_stay_on_level() {
        let c = GridCoord::new(2, 3, 4);
        assert_eq!(c.below(), GridCoord::new(2, 2, 4));
        assert!(c.lateral_neighbors().iter().all(|n| n.y == 3));
        assert!(!c.lateral_neighbors().contains(&c));
    }

    #[test]
    fn test_level_key_orders_by_height_first() {
        let mut cells = vec![
            GridCoord::new(0, 1, 0),
            GridCoord::new(5, 0, 5),
            GridCoord::new(1, 0, 9),
        ];
        cells.sort_by_key(GridCoord::level_key);
        assert_eq!(
            cells,
            vec![
                GridCoord::new(1, 0, 9),
                GridCoord::new(5, 0, 5),
                GridCoord::new(0, 1, 0)
            ]
        );
    }
}
