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

//! Layer-by-layer text rendering of a slot graph.
//!
//! Each level is printed as a block of rows (x) by columns (z) over the
//! bounding box of the graph:
//!
//! | Glyph | Meaning              |
//! |-------|----------------------|
//! | `#`   | filled               |
//! | `o`   | available            |
//! | `.`   | locked               |
//! | `!`   | unreachable          |
//! | ` `   | no slot in this cell |

use std::fmt::Write;

use crate::slot::{Slot, SlotGraph, SlotState};

fn glyph(slot: &Slot) -> char {
    match slot.state {
        SlotState::Filled => '#',
        SlotState::Available => 'o',
        SlotState::Locked if slot.is_unreachable() => '!',
        SlotState::Locked => '.',
    }
}

/// Renders every level of `graph`, bottom to top.
pub fn render_layers(graph: &SlotGraph) -> String {
    let mut out = String::new();
    let Some(first) = graph.slots().first() else {
        return out;
    };

    let (mut min, mut max) = (first.coord, first.coord);
    for slot in graph.slots() {
        let c = slot.coord;
        min.x = min.x.min(c.x);
        min.y = min.y.min(c.y);
        min.z = min.z.min(c.z);
        max.x = max.x.max(c.x);
        max.y = max.y.max(c.y);
        max.z = max.z.max(c.z);
    }

    for y in min.y..=max.y {
        let _ = writeln!(out, "Layer y={y}:");
        for x in min.x..=max.x {
            out.push_str("  ");
            for z in min.z..=max.z {
                let cell = tessera_core::GridCoord::new(x, y, z);
                out.push(graph.slot_at(cell).map_or(' ', glyph));
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::GridFrame;
    use crate::slot::{Slot, SupportKind};
    use tessera_core::GridCoord;

    #[test]
    fn test_empty_graph_renders_nothing() {
        assert!(render_layers(&SlotGraph::empty()).is_empty());
    }

    #[test]
    fn test_column_renders_one_cell_per_layer() {
        let frame = GridFrame::default();
        let a = GridCoord::new(2, 0, 2);
        let b = GridCoord::new(2, 1, 2);
        let slots = vec![
            Slot::new(0, a, frame.to_world(a), SupportKind::Ground, vec![]),
            Slot::new(1, b, frame.to_world(b), SupportKind::Vertical, vec![0]),
        ];
        let mut graph = SlotGraph::new(slots, frame).unwrap();
        assert_eq!(render_layers(&graph), "Layer y=0:\n  o\nLayer y=1:\n  .\n");
        graph.fill(0);
        assert_eq!(render_layers(&graph), "Layer y=0:\n  #\nLayer y=1:\n  o\n");
    }
}
