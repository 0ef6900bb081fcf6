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

//! Point-mass physics without contacts.

use std::collections::BTreeMap;

use tessera_core::math::{Quat, Vec3};
use tessera_core::physics::{
    BodyType, ColliderDesc, ColliderHandle, PhysicsProvider, RigidBodyDesc, RigidBodyHandle,
};

#[derive(Debug, Clone)]
struct PointBody {
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    force: Vec3,
    inv_mass: f32,
    linear_damping: f32,
    gravity_scale: f32,
    body_type: BodyType,
}

/// Semi-implicit Euler integration of point masses.
///
/// Dynamic bodies react to forces, gravity and damping; kinematic bodies move
/// with their velocity; static bodies never move. Colliders are recorded but
/// no contacts are resolved.
#[derive(Debug, Clone)]
pub struct NativePhysicsWorld {
    bodies: BTreeMap<u64, PointBody>,
    colliders: BTreeMap<u64, ColliderDesc>,
    gravity: Vec3,
    next_body: u64,
    next_collider: u64,
}

impl Default for NativePhysicsWorld {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
            colliders: BTreeMap::new(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            next_body: 0,
            next_collider: 0,
        }
    }
}

impl NativePhysicsWorld {
    /// Creates an empty world with standard gravity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl PhysicsProvider for NativePhysicsWorld {
    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            match body.body_type {
                BodyType::Static => {}
                BodyType::Kinematic => body.position += body.velocity * dt,
                BodyType::Dynamic => {
                    let accel = body.force * body.inv_mass + gravity * body.gravity_scale;
                    body.velocity += accel * dt;
                    body.velocity = body.velocity * (1.0 / (1.0 + body.linear_damping * dt));
                    body.position += body.velocity * dt;
                }
            }
        }
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn add_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let id = self.next_body;
        self.next_body += 1;
        let inv_mass = if desc.mass > 0.0 { 1.0 / desc.mass } else { 0.0 };
        self.bodies.insert(
            id,
            PointBody {
                position: desc.position,
                rotation: desc.rotation,
                velocity: desc.linear_velocity,
                force: Vec3::ZERO,
                inv_mass,
                linear_damping: desc.linear_damping.max(0.0),
                gravity_scale: desc.gravity_scale,
                body_type: desc.body_type,
            },
        );
        log::debug!("Native physics: added {:?} body {}", desc.body_type, id);
        RigidBodyHandle(id)
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        if self.bodies.remove(&handle.0).is_some() {
            self.colliders
                .retain(|_, c| c.parent_body != Some(handle));
            log::debug!("Native physics: removed body {}", handle.0);
        }
    }

    fn add_collider(&mut self, desc: ColliderDesc) -> ColliderHandle {
        let id = self.next_collider;
        self.next_collider += 1;
        self.colliders.insert(id, desc);
        ColliderHandle(id)
    }

    fn get_body_transform(&self, handle: RigidBodyHandle) -> (Vec3, Quat) {
        self.bodies
            .get(&handle.0)
            .map_or((Vec3::ZERO, Quat::IDENTITY), |b| (b.position, b.rotation))
    }

    fn set_body_transform(&mut self, handle: RigidBodyHandle, pos: Vec3, rot: Quat) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.position = pos;
            body.rotation = rot;
        }
    }

    fn get_body_velocity(&self, handle: RigidBodyHandle) -> Vec3 {
        self.bodies.get(&handle.0).map_or(Vec3::ZERO, |b| b.velocity)
    }

    fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.velocity = velocity;
        }
    }

    fn set_body_force(&mut self, handle: RigidBodyHandle, force: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.force = force;
        }
    }

    fn set_body_type(&mut self, handle: RigidBodyHandle, body_type: BodyType) {
        if let Some(body) = self.bodies.get_mut(&handle.0) {
            body.body_type = body_type;
            if body_type != BodyType::Dynamic {
                body.force = Vec3::ZERO;
            }
            if body_type == BodyType::Static {
                body.velocity = Vec3::ZERO;
            }
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
