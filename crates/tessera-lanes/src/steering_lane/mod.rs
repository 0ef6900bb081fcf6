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

//! Desired-velocity computation for the drone pool.
//!
//! Steering blends three terms for a moving drone:
//!
//! 1. **Goal seeking** toward the claimed slot, slowing down inside the
//!    arrival radius.
//! 2. **Surface following**: while the drone is horizontally farther than the
//!    approach radius from its slot, it aims at the locally known top of
//!    filled geometry plus a hover clearance; inside the radius the height is
//!    unclamped for the final climb.
//! 3. **Separation** from other moving or attached drones inside the
//!    separation radius, with inverse-distance falloff. When the push would
//!    cancel forward progress it is redirected perpendicular to the goal.
//!
//! Parking drones only seek their parking target and are never checked for
//! separation, so the neighbour-check cost scales with the number of movers.

mod spatial_hash;

pub use spatial_hash::SpatialHash;

use tessera_core::config::MotionSettings;
use tessera_core::lane::{Lane, LaneKind, LaneWorkload};
use tessera_core::math::{Vec3, EPSILON};
use tessera_data::{Drone, DroneState, SlotGraph, StructureTransform};

/// Share of the goal speed that separation may not eat into before it is redirected.
const MIN_FORWARD_FRACTION: f32 = 0.25;

/// Shared, read-only state a steering pass looks at.
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    /// Slot positions and the filled surface.
    pub graph: &'a SlotGraph,
    /// Current structure transform; slot targets are moved with it.
    pub transform: &'a StructureTransform,
    /// Tuning.
    pub settings: &'a MotionSettings,
}

/// Result of a steering pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SteeringOutput {
    /// Desired velocity per drone, index-aligned with the pool.
    pub velocities: Vec<Vec3>,
    /// Pairwise distance checks performed for separation.
    pub pair_checks: usize,
}

/// A lane that computes a desired velocity for every drone.
pub trait SteeringLane: Lane {
    /// Computes desired velocities for `drones`.
    fn steer(&self, drones: &[Drone], ctx: &SteeringContext<'_>) -> SteeringOutput;
}

/// Goal seeking with separation and surface following.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwarmSteeringLane;

impl SwarmSteeringLane {
    /// Creates a new `SwarmSteeringLane`.
    pub fn new() -> Self {
        Self
    }

    /// World-space point a drone is heading for, if any.
    pub fn target_of(drone: &Drone, ctx: &SteeringContext<'_>) -> Option<Vec3> {
        match drone.state {
            DroneState::Parking => Some(drone.parking_target),
            DroneState::MovingToSlot => drone
                .claim
                .and_then(|id| ctx.graph.get(id))
                .map(|slot| ctx.transform.apply(slot.position)),
            DroneState::Attached => None,
        }
    }

    /// Intermediate aim point that keeps a travelling drone above the structure.
    fn waypoint(drone: &Drone, target: Vec3, ctx: &SteeringContext<'_>) -> Vec3 {
        let s = ctx.settings;
        if drone.position.horizontal_distance(target) <= s.approach_radius {
            return target;
        }
        let local = ctx.transform.inverse_apply(drone.position);
        match ctx.graph.surface_height_near(local) {
            Some(top) => {
                let cruise = top + ctx.transform.offset().y + s.hover_clearance;
                target.with_y(cruise.max(target.y))
            }
            None => target,
        }
    }

    fn seek(from: Vec3, to: Vec3, settings: &MotionSettings) -> Vec3 {
        let delta = to - from;
        let dist = delta.length();
        if dist < EPSILON {
            return Vec3::ZERO;
        }
        let ramp = if settings.arrival_radius > 0.0 {
            (dist / settings.arrival_radius).min(1.0)
        } else {
            1.0
        };
        delta / dist * (settings.max_speed * ramp)
    }

    /// Deterministic sideways direction for head-on and coincident cases.
    fn side(dir: Vec3, id: usize) -> Vec3 {
        let lateral = dir.cross(Vec3::Y).normalize_or_zero();
        let lateral = if lateral == Vec3::ZERO { Vec3::X } else { lateral };
        if id % 2 == 0 {
            lateral
        } else {
            -lateral
        }
    }

    fn separation(
        index: usize,
        drones: &[Drone],
        hash: &SpatialHash,
        settings: &MotionSettings,
        pair_checks: &mut usize,
    ) -> Vec3 {
        let me = &drones[index];
        let radius = settings.separation_radius;
        let mut push = Vec3::ZERO;
        for other in hash.candidates(me.position) {
            if other == index {
                continue;
            }
            *pair_checks += 1;
            let away = me.position - drones[other].position;
            let d = away.length();
            if d >= radius {
                continue;
            }
            if d < EPSILON {
                push += Self::side(Vec3::Z, me.id) * radius;
                continue;
            }
            push += away / d * (radius / d - 1.0);
        }
        push
    }
}

impl Lane for SwarmSteeringLane {
    fn strategy_name(&self) -> &'static str {
        "Swarm"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Steering
    }

    fn estimate_cost(&self, workload: &LaneWorkload) -> f32 {
        workload.drones as f32 + workload.movers as f32 * 27.0
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl SteeringLane for SwarmSteeringLane {
    fn steer(&self, drones: &[Drone], ctx: &SteeringContext<'_>) -> SteeringOutput {
        let s = ctx.settings;
        let mut hash = SpatialHash::new(s.separation_radius);
        for (i, d) in drones.iter().enumerate() {
            if !d.is_free() {
                hash.insert(i, d.position);
            }
        }

        let mut out = SteeringOutput {
            velocities: Vec::with_capacity(drones.len()),
            pair_checks: 0,
        };

        for (i, drone) in drones.iter().enumerate() {
            let Some(target) = Self::target_of(drone, ctx) else {
                out.velocities.push(Vec3::ZERO);
                continue;
            };
            if drone.is_free() {
                out.velocities.push(Self::seek(drone.position, target, s));
                continue;
            }

            let aim = Self::waypoint(drone, target, ctx);
            let goal = Self::seek(drone.position, aim, s);
            let dir = (aim - drone.position).normalize_or_zero();
            let speed = goal.length();

            let raw = Self::separation(i, drones, &hash, s, &mut out.pair_checks);
            // Fade out near the slot so neighbours already attached do not block locking.
            let fade = if s.arrival_radius > 0.0 {
                (drone.position.distance(target) / s.arrival_radius).min(1.0)
            } else {
                1.0
            };
            let mut sep = (raw * (s.separation_strength * s.max_speed * fade)).clamp_length(s.max_speed);

            let along = sep.dot(dir);
            if along < 0.0 && speed + along < speed * MIN_FORWARD_FRACTION {
                let lateral = sep - dir * along;
                let magnitude = sep.length();
                sep = if lateral.length_squared() > EPSILON {
                    lateral.normalize_or_zero() * magnitude
                } else {
                    Self::side(dir, drone.id) * magnitude
                };
            }

            out.velocities.push((goal + sep).clamp_length(s.max_speed));
        }
        out
    }
}
