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

//! Uniform grid bucketing of drone positions for neighbourhood queries.

use std::collections::HashMap;

use tessera_core::math::Vec3;

type CellKey = (i32, i32, i32);

/// Buckets indices by position into cubic cells of a fixed size.
///
/// A query with radius no larger than the cell size only has to look at the
/// 27 cells around the query point.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialHash {
    /// Creates an empty hash. Non-positive sizes fall back to `1.0`.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: Vec3) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    /// Adds `index` at `position`.
    pub fn insert(&mut self, index: usize, position: Vec3) {
        let key = self.key(position);
        self.cells.entry(key).or_default().push(index);
    }

    /// Removes every entry, keeping allocations.
    pub fn clear(&mut self) {
        self.cells.values_mut().for_each(Vec::clear);
    }

    /// Indices in the 27 cells around `position`, unfiltered by distance.
    pub fn candidates(&self, position: Vec3) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy, cz) = self.key(position);
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                (-1..=1).flat_map(move |dz| {
                    self.cells
                        .get(&(cx + dx, cy + dy, cz + dz))
                        .into_iter()
                        .flatten()
                        .copied()
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_cover_neighbouring_cells_only() {
        let mut hash = SpatialHash::new(1.0);
        hash.insert(0, Vec3::new(0.1, 0.1, 0.1));
        hash.insert(1, Vec3::new(0.9, 0.5, 1.4));
        hash.insert(2, Vec3::new(5.0, 0.0, 0.0));

        let mut near: Vec<usize> = hash.candidates(Vec3::new(0.5, 0.5, 0.5)).collect();
        near.sort_unstable();
        assert_eq!(near, vec![0, 1]);

        hash.clear();
        assert_eq!(hash.candidates(Vec3::ZERO).count(), 0);
    }
}
