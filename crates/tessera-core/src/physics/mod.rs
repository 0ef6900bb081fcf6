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

//! # Physics Abstractions
//!
//! The contract a rigid-body simulation must fulfil to drive drones with
//! forces instead of direct position writes.

use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3};

/// Opaque handle to a rigid body in the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RigidBodyHandle(pub u64);

/// Opaque handle to a collider in the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderHandle(pub u64);

/// Defines the type of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Responds to forces and collisions.
    Dynamic,
    /// Fixed in place, does not move.
    Static,
    /// Moved only through explicit transform writes.
    Kinematic,
}

/// Description for creating a rigid body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    /// Initial position.
    pub position: Vec3,
    /// Initial rotation.
    pub rotation: Quat,
    /// Body type.
    pub body_type: BodyType,
    /// Initial linear velocity.
    pub linear_velocity: Vec3,
    /// Mass of the body in kg (dynamic only).
    pub mass: f32,
    /// Linear velocity damping coefficient.
    pub linear_damping: f32,
    /// Multiplier on the world gravity. Drones hover with `0.0`.
    pub gravity_scale: f32,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            body_type: BodyType::Dynamic,
            linear_velocity: Vec3::ZERO,
            mass: 1.0,
            linear_damping: 0.0,
            gravity_scale: 1.0,
        }
    }
}

/// Supported collider shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Box with half-extents.
    Box(Vec3),
    /// Sphere with radius.
    Sphere(f32),
}

/// Description for creating a collider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderDesc {
    /// Associated rigid body if any.
    pub parent_body: Option<RigidBodyHandle>,
    /// Position relative to the parent body (or world when detached).
    pub position: Vec3,
    /// Shape of the collider.
    pub shape: ColliderShape,
}

/// Interface contract for any physics engine implementation (e.g., Rapier).
///
/// Handles that no longer resolve to a body are ignored by setters and yield
/// neutral values from getters; the assembly core never treats them as faults.
pub trait PhysicsProvider: Send + Sync {
    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Sets the global gravity vector.
    fn set_gravity(&mut self, gravity: Vec3);

    /// Adds a rigid body to the simulation.
    fn add_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle;

    /// Removes a rigid body (and its attached colliders) from the simulation.
    fn remove_body(&mut self, handle: RigidBodyHandle);

    /// Adds a collider to the simulation.
    fn add_collider(&mut self, desc: ColliderDesc) -> ColliderHandle;

    /// Returns the position and rotation of a rigid body.
    fn get_body_transform(&self, handle: RigidBodyHandle) -> (Vec3, Quat);

    /// Teleports a rigid body.
    fn set_body_transform(&mut self, handle: RigidBodyHandle, pos: Vec3, rot: Quat);

    /// Returns the linear velocity of a rigid body.
    fn get_body_velocity(&self, handle: RigidBodyHandle) -> Vec3;

    /// Overwrites the linear velocity of a rigid body.
    fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3);

    /// Replaces the persistent force applied to a body until the next call.
    fn set_body_force(&mut self, handle: RigidBodyHandle, force: Vec3);

    /// Changes how the body participates in the simulation.
    fn set_body_type(&mut self, handle: RigidBodyHandle, body_type: BodyType);

    /// Number of live rigid bodies.
    fn body_count(&self) -> usize;
}
