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

use std::collections::HashSet;

use anyhow::Result;
use approx::assert_abs_diff_eq;
use tessera_agents::AssemblyAgent;
use tessera_core::config::AllocationSettings;
use tessera_core::math::{Vec3, FRAC_PI_2};
use tessera_core::{AllocationStrategy, AssemblyConfig, GridCoord, IslandPolicy};
use tessera_data::{SlotState, VisualState};

const DT: f32 = 1.0 / 30.0;
const MAX_TICKS: usize = 3000;

fn config(drones: usize, strategy: AllocationStrategy, interval: u32) -> AssemblyConfig {
    AssemblyConfig {
        drone_count: drones,
        allocation: AllocationSettings {
            strategy,
            decision_interval_ticks: interval,
        },
        ..AssemblyConfig::default()
    }
}

fn assert_unique_claims(agent: &AssemblyAgent) {
    let mut seen = HashSet::new();
    for drone in agent.drones() {
        if let Some(slot) = drone.claim {
            assert!(seen.insert(slot), "slot {slot} claimed twice");
        }
    }
}

/// Ticks until every reachable slot is filled, checking claims each tick.
fn run_to_completion(agent: &mut AssemblyAgent) -> usize {
    for n in 0..MAX_TICKS {
        agent.tick(DT);
        assert_unique_claims(agent);
        if agent.graph().is_complete() {
            return n + 1;
        }
    }
    panic!("assembly did not complete: {:?}", agent.stats());
}

#[test]
fn test_second_drone_waits_for_supported_slot() -> Result<()> {
    tessera_telemetry::init_logging();
    let interval = 5;
    let mut agent = AssemblyAgent::new(config(2, AllocationStrategy::Decentralized, interval))?;
    agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(0, 1, 0)])?;

    let mut filled_at = None;
    for _ in 0..MAX_TICKS {
        let report = agent.tick(DT);
        assert_unique_claims(&agent);
        assert!(agent.stats().drones_moving + agent.stats().drones_attached <= 1);
        if report.fills > 0 {
            filled_at = Some(report.tick);
            break;
        }
    }
    assert!(filled_at.is_some(), "first slot never filled");

    let waiting = agent
        .drones()
        .iter()
        .find(|d| d.is_free())
        .map(|d| d.id)
        .expect("one drone still parked");
    assert_eq!(agent.graph().get(1).unwrap().state, SlotState::Available);

    for _ in 0..interval {
        agent.tick(DT);
    }
    assert_eq!(agent.drones()[waiting].claim, Some(1));

    run_to_completion(&mut agent);
    assert_eq!(agent.stats().drones_attached, 2);
    Ok(())
}

#[test]
fn test_surplus_drones_stay_parked() -> Result<()> {
    tessera_telemetry::init_logging();
    for strategy in [AllocationStrategy::Centralized, AllocationStrategy::Decentralized] {
        let mut agent = AssemblyAgent::new(config(50, strategy, 10))?;
        agent.build(&[
            GridCoord::new(0, 0, 0),
            GridCoord::new(1, 0, 0),
            GridCoord::new(2, 0, 0),
        ])?;
        run_to_completion(&mut agent);

        for _ in 0..30 {
            agent.tick(DT);
            assert_unique_claims(&agent);
        }
        let stats = agent.stats();
        assert_eq!(stats.slots_filled, 3);
        assert_eq!(stats.drones_attached, 3);
        assert_eq!(stats.drones_parking, 47);
        assert_eq!(stats.drones_moving, 0);
        assert_eq!(stats.fraction_complete, 1.0);
    }
    Ok(())
}

#[test]
fn test_tower_fills_bottom_up() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(6, AllocationStrategy::Centralized, 1))?;
    let cells: Vec<GridCoord> = (0..4).map(|y| GridCoord::new(0, y, 0)).collect();
    agent.build(&cells)?;

    let mut fill_order = Vec::new();
    for _ in 0..MAX_TICKS {
        let before: Vec<SlotState> = agent.slots().iter().map(|s| s.state).collect();
        agent.tick(DT);
        for (slot, old) in agent.slots().iter().zip(before) {
            if old != SlotState::Filled && slot.state == SlotState::Filled {
                fill_order.push(slot.coord.y);
            }
        }
        if agent.graph().is_complete() {
            break;
        }
    }
    assert_eq!(fill_order, vec![0, 1, 2, 3]);
    Ok(())
}

#[test]
fn test_attached_drones_hold_position() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(8, AllocationStrategy::Centralized, 1))?;
    agent.build(&[
        GridCoord::new(0, 0, 0),
        GridCoord::new(1, 0, 0),
        GridCoord::new(1, 1, 0),
    ])?;
    run_to_completion(&mut agent);

    let snapshot: Vec<(usize, Vec3)> = agent
        .drones()
        .iter()
        .filter(|d| d.is_attached())
        .map(|d| (d.id, d.position))
        .collect();
    assert_eq!(snapshot.len(), 3);
    for (id, position) in &snapshot {
        let slot = agent.graph().get(agent.drones()[*id].claim.unwrap()).unwrap();
        assert_eq!(*position, slot.position);
    }

    for _ in 0..100 {
        agent.tick(DT);
    }
    for (id, position) in &snapshot {
        assert_eq!(agent.drones()[*id].position, *position);
        assert_eq!(agent.visual_states()[*id], VisualState::Attached);
    }
    Ok(())
}

#[test]
fn test_structure_commands_move_attached_drones() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(4, AllocationStrategy::Centralized, 1))?;
    agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(1, 0, 0)])?;
    run_to_completion(&mut agent);

    let bases: Vec<(usize, Vec3)> = agent
        .drones()
        .iter()
        .filter(|d| d.is_attached())
        .map(|d| (d.id, d.position))
        .collect();

    agent.translate_structure(3.0, 0.0, -2.0);
    for _ in 0..300 {
        agent.tick(DT);
    }
    assert!(agent.structure_transform().is_settled());
    for (id, base) in &bases {
        let moved = agent.drones()[*id].position;
        assert_abs_diff_eq!(moved, *base + Vec3::new(3.0, 0.0, -2.0), epsilon = 1e-5);
    }

    agent.rotate_structure_y(FRAC_PI_2);
    for _ in 0..300 {
        agent.tick(DT);
    }
    let t = *agent.structure_transform();
    for (id, base) in &bases {
        assert_abs_diff_eq!(agent.drones()[*id].position, t.apply(*base), epsilon = 1e-5);
    }

    agent.reset_structure_transform();
    for _ in 0..300 {
        agent.tick(DT);
    }
    assert!(agent.structure_transform().is_identity());
    for (id, base) in &bases {
        assert_eq!(agent.drones()[*id].position, *base);
    }
    assert_eq!(agent.stats().drones_attached, 2);
    Ok(())
}

#[test]
fn test_build_under_transform_lands_in_moved_frame() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(4, AllocationStrategy::Centralized, 1))?;
    agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(0, 1, 0)])?;
    agent.translate_structure(0.0, 0.0, 4.0);
    run_to_completion(&mut agent);

    for drone in agent.drones().iter().filter(|d| d.is_attached()) {
        let slot = agent.graph().get(drone.claim.unwrap()).unwrap();
        assert_abs_diff_eq!(
            drone.position,
            slot.position + Vec3::new(0.0, 0.0, 4.0),
            epsilon = 1e-4
        );
    }
    Ok(())
}

#[test]
fn test_rebuild_and_scatter_release_everything() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(5, AllocationStrategy::Decentralized, 3))?;
    agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(1, 0, 0)])?;
    run_to_completion(&mut agent);

    let resolution = agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(5, 2, 5)])?;
    assert_eq!(resolution.dropped, vec![GridCoord::new(5, 2, 5)]);
    assert_eq!(agent.slots().len(), 1);
    assert!(agent.drones().iter().all(|d| d.is_free()));
    run_to_completion(&mut agent);
    assert_eq!(agent.stats().drones_attached, 1);

    agent.scatter();
    assert!(agent.slots().is_empty());
    for _ in 0..10 {
        agent.tick(DT);
    }
    assert_eq!(agent.stats().drones_parking, 5);
    Ok(())
}

#[test]
fn test_strategy_switch_mid_build() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(10, AllocationStrategy::Decentralized, 10))?;
    let cells: Vec<GridCoord> = (0..3)
        .flat_map(|x| (0..2).map(move |y| GridCoord::new(x, y, 0)))
        .collect();
    agent.build(&cells)?;
    for _ in 0..20 {
        agent.tick(DT);
        assert_unique_claims(&agent);
    }
    agent.set_allocation_strategy(AllocationStrategy::Centralized);
    run_to_completion(&mut agent);
    assert_eq!(agent.stats().slots_filled, 6);
    Ok(())
}

#[test]
fn test_config_file_drives_agent() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/assembly.ron");
    let config = AssemblyConfig::load(path)?;
    assert_eq!(config.drone_count, 12);
    assert_eq!(config.physics.substeps, 2);

    let mut agent = AssemblyAgent::new(config)?;
    assert_eq!(agent.allocation_strategy(), AllocationStrategy::Centralized);

    let resolution = agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(4, 2, 4)])?;
    assert_eq!(resolution.relaxed, vec![GridCoord::new(4, 2, 4)]);
    assert_eq!(agent.graph().unreachable().count(), 1);

    run_to_completion(&mut agent);
    let stats = agent.stats();
    assert_eq!(stats.slots_filled, 1);
    assert_eq!(stats.slots_unreachable, 1);
    assert_eq!(stats.fraction_complete, 1.0);
    Ok(())
}

#[test]
fn test_relaxed_island_stack_counts_as_unreachable() -> Result<()> {
    let mut agent = AssemblyAgent::new(AssemblyConfig {
        island_policy: IslandPolicy::PlaceLowestLayer,
        ..config(4, AllocationStrategy::Centralized, 1)
    })?;
    let resolution = agent.build(&[
        GridCoord::new(0, 0, 0),
        GridCoord::new(4, 2, 4),
        GridCoord::new(4, 3, 4),
    ])?;
    assert_eq!(resolution.relaxed, vec![GridCoord::new(4, 2, 4)]);
    assert_eq!(agent.graph().unreachable().count(), 2);

    run_to_completion(&mut agent);
    let stats = agent.stats();
    assert!(agent.graph().is_complete());
    assert_eq!(stats.slots_filled, 1);
    assert_eq!(stats.slots_unreachable, 2);
    assert_eq!(stats.fraction_complete, 1.0);
    assert_eq!(stats.drones_attached, 1);
    Ok(())
}
