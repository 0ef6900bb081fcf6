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

//! Integration of desired velocities into drone motion.

use tessera_core::config::MotionSettings;
use tessera_core::lane::{Lane, LaneKind, LaneWorkload};
use tessera_core::math::Vec3;
use tessera_core::physics::PhysicsProvider;
use tessera_data::Drone;

/// Per-tick inputs of a motion pass.
pub struct MotionContext<'a> {
    /// Tuning.
    pub settings: &'a MotionSettings,
    /// Tick length in seconds.
    pub dt: f32,
    /// Physics collaborator, when drones carry dynamics bodies.
    pub physics: Option<&'a mut dyn PhysicsProvider>,
}

/// A lane that moves drones toward their desired velocities.
///
/// Attached drones are never moved by a motion lane.
pub trait MotionLane: Lane {
    /// Moves every non-attached drone for one tick.
    fn integrate(&self, drones: &mut [Drone], desired: &[Vec3], ctx: &mut MotionContext<'_>);
}

fn integrate_kinematic(drone: &mut Drone, desired: Vec3, settings: &MotionSettings, dt: f32) {
    let max_dv = settings.max_acceleration * dt;
    let dv = (desired - drone.velocity).clamp_length(max_dv);
    drone.velocity += dv;
    drone.position += drone.velocity * dt;
}

/// Acceleration-limited direct position integration.
#[derive(Debug, Default, Clone, Copy)]
pub struct KinematicMotionLane;

impl KinematicMotionLane {
    /// Creates a new `KinematicMotionLane`.
    pub fn new() -> Self {
        Self
    }
}

impl Lane for KinematicMotionLane {
    fn strategy_name(&self) -> &'static str {
        "Kinematic"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Motion
    }

    fn estimate_cost(&self, workload: &LaneWorkload) -> f32 {
        workload.drones as f32
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl MotionLane for KinematicMotionLane {
    fn integrate(&self, drones: &mut [Drone], desired: &[Vec3], ctx: &mut MotionContext<'_>) {
        for (drone, &want) in drones.iter_mut().zip(desired) {
            if drone.is_attached() {
                continue;
            }
            integrate_kinematic(drone, want, ctx.settings, ctx.dt);
        }
    }
}

/// Steering as a damped force on dynamics bodies, stepped in fixed sub-steps.
///
/// The force is `(desired - velocity) * steering_gain * mass`. Drones without
/// a body, or a pass without a provider, fall back to kinematic integration.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsMotionLane {
    substeps: u32,
}

impl Default for PhysicsMotionLane {
    fn default() -> Self {
        Self::new(4)
    }
}

impl PhysicsMotionLane {
    /// Creates a lane stepping the provider `substeps` times per tick (at least once).
    pub fn new(substeps: u32) -> Self {
        Self {
            substeps: substeps.max(1),
        }
    }

    /// Physics sub-steps per tick.
    pub fn substeps(&self) -> u32 {
        self.substeps
    }
}

impl Lane for PhysicsMotionLane {
    fn strategy_name(&self) -> &'static str {
        "Physics"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Motion
    }

    fn estimate_cost(&self, workload: &LaneWorkload) -> f32 {
        workload.drones as f32 * self.substeps as f32
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl MotionLane for PhysicsMotionLane {
    fn integrate(&self, drones: &mut [Drone], desired: &[Vec3], ctx: &mut MotionContext<'_>) {
        let settings = ctx.settings;
        let dt = ctx.dt;
        let Some(provider) = ctx.physics.as_deref_mut() else {
            log::trace!("No physics provider; integrating kinematically");
            for (drone, &want) in drones.iter_mut().zip(desired) {
                if !drone.is_attached() {
                    integrate_kinematic(drone, want, settings, dt);
                }
            }
            return;
        };

        for (drone, &want) in drones.iter_mut().zip(desired) {
            if drone.is_attached() {
                continue;
            }
            match drone.body {
                Some(body) => {
                    let velocity = provider.get_body_velocity(body);
                    let force = (want - velocity) * (settings.steering_gain * settings.drone_mass);
                    provider.set_body_force(body, force);
                }
                None => integrate_kinematic(drone, want, settings, dt),
            }
        }

        let h = dt / self.substeps as f32;
        for _ in 0..self.substeps {
            provider.step(h);
        }

        for drone in drones.iter_mut().filter(|d| !d.is_attached()) {
            if let Some(body) = drone.body {
                let (position, _) = provider.get_body_transform(body);
                drone.position = position;
                drone.velocity = provider.get_body_velocity(body);
            }
        }
    }
}
