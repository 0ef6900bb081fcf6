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

use anyhow::Result;
use approx::assert_abs_diff_eq;
use tessera_agents::AssemblyAgent;
use tessera_core::config::AllocationSettings;
use tessera_core::math::Vec3;
use tessera_core::physics::PhysicsProvider;
use tessera_core::{AllocationStrategy, AssemblyConfig, GridCoord};
use tessera_infra::{NativePhysicsWorld, RapierPhysicsWorld};

const DT: f32 = 1.0 / 60.0;

fn config(drones: usize) -> AssemblyConfig {
    AssemblyConfig {
        drone_count: drones,
        allocation: AllocationSettings {
            strategy: AllocationStrategy::Centralized,
            decision_interval_ticks: 1,
        },
        ..AssemblyConfig::default()
    }
}

fn run(agent: &mut AssemblyAgent, max_ticks: usize) -> bool {
    for _ in 0..max_ticks {
        agent.tick(DT);
        if agent.graph().is_complete() {
            return true;
        }
    }
    false
}

fn assert_bodies_follow_drones(agent: &AssemblyAgent) {
    let physics = agent.physics().expect("physics attached");
    for drone in agent.drones() {
        let body = drone.body.expect("every drone has a body");
        let (position, _) = physics.get_body_transform(body);
        assert_abs_diff_eq!(position, drone.position, epsilon = 1e-4);
    }
}

#[test]
fn test_native_physics_drives_assembly() -> Result<()> {
    tessera_telemetry::init_logging();
    let mut agent = AssemblyAgent::new(config(6))?
        .with_physics(Box::new(NativePhysicsWorld::new()));
    assert_eq!(agent.physics().map(|p| p.body_count()), Some(6));

    agent.build(&[
        GridCoord::new(0, 0, 0),
        GridCoord::new(1, 0, 0),
        GridCoord::new(0, 1, 0),
    ])?;
    assert!(run(&mut agent, 4000), "stalled: {:?}", agent.stats());
    assert_eq!(agent.stats().drones_attached, 3);
    assert_bodies_follow_drones(&agent);
    Ok(())
}

#[test]
fn test_native_physics_moves_attached_bodies_with_structure() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(2))?
        .with_physics(Box::new(NativePhysicsWorld::new()));
    agent.build(&[GridCoord::new(0, 0, 0)])?;
    assert!(run(&mut agent, 4000));

    agent.translate_structure(0.0, 2.0, 0.0);
    for _ in 0..600 {
        agent.tick(DT);
    }
    let attached = agent
        .drones()
        .iter()
        .find(|d| d.is_attached())
        .expect("one drone attached");
    let slot = agent.graph().get(attached.claim.unwrap()).unwrap();
    assert_abs_diff_eq!(attached.position, slot.position + Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-4);
    assert_bodies_follow_drones(&agent);
    Ok(())
}

#[test]
fn test_rapier_physics_drives_assembly() -> Result<()> {
    let mut agent = AssemblyAgent::new(config(3))?
        .with_physics(Box::new(RapierPhysicsWorld::new()));
    agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(0, 1, 0)])?;
    assert!(run(&mut agent, 6000), "stalled: {:?}", agent.stats());
    assert_eq!(agent.stats().drones_attached, 2);

    let physics = agent.physics().expect("physics attached");
    for drone in agent.drones().iter().filter(|d| d.is_attached()) {
        let (position, _) = physics.get_body_transform(drone.body.unwrap());
        assert_abs_diff_eq!(position, drone.position, epsilon = 1e-3);
    }
    Ok(())
}
