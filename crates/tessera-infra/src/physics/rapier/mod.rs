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

//! Rapier implementation of the physics provider.

mod conversions;

use conversions::*;
use rapier3d::prelude::*;
use tessera_core::math::{Quat, Vec3};
use tessera_core::physics::{
    BodyType, ColliderDesc, ColliderHandle, ColliderShape, PhysicsProvider, RigidBodyDesc,
    RigidBodyHandle,
};

fn rapier_body_type(body_type: BodyType) -> RigidBodyType {
    match body_type {
        BodyType::Dynamic => RigidBodyType::Dynamic,
        BodyType::Static => RigidBodyType::Fixed,
        BodyType::Kinematic => RigidBodyType::KinematicVelocityBased,
    }
}

/// Implementation of the `PhysicsProvider` trait using the Rapier3D physics engine.
///
/// Bodies are created with locked rotations; drones are steered by
/// translation only.
pub struct RapierPhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for RapierPhysicsWorld {
    fn default() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

impl RapierPhysicsWorld {
    /// Creates an empty world with standard gravity.
    pub fn new() -> Self {
        Self::default()
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(unpack_body(handle))
    }
}

impl PhysicsProvider for RapierPhysicsWorld {
    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_rapier_vec(gravity);
    }

    fn add_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::new(rapier_body_type(desc.body_type))
            .translation(to_rapier_vec(desc.position))
            .rotation(to_rapier_quat(desc.rotation).scaled_axis())
            .linvel(to_rapier_vec(desc.linear_velocity))
            .additional_mass(desc.mass)
            .linear_damping(desc.linear_damping)
            .gravity_scale(desc.gravity_scale)
            .lock_rotations()
            .build();
        pack_body(self.rigid_body_set.insert(rigid_body))
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            unpack_body(handle),
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    fn add_collider(&mut self, desc: ColliderDesc) -> ColliderHandle {
        let builder = match desc.shape {
            ColliderShape::Box(half) => ColliderBuilder::cuboid(half.x, half.y, half.z),
            ColliderShape::Sphere(r) => ColliderBuilder::ball(r),
        };
        // Body mass comes from the rigid body description alone.
        let collider = builder
            .translation(to_rapier_vec(desc.position))
            .density(0.0)
            .build();

        let handle = match desc.parent_body {
            Some(parent) => self.collider_set.insert_with_parent(
                collider,
                unpack_body(parent),
                &mut self.rigid_body_set,
            ),
            None => self.collider_set.insert(collider),
        };
        pack_collider(handle)
    }

    fn get_body_transform(&self, handle: RigidBodyHandle) -> (Vec3, Quat) {
        match self.rigid_body_set.get(unpack_body(handle)) {
            Some(rb) => (from_rapier_vec(rb.translation()), from_rapier_quat(rb.rotation())),
            None => (Vec3::ZERO, Quat::IDENTITY),
        }
    }

    fn set_body_transform(&mut self, handle: RigidBodyHandle, pos: Vec3, rot: Quat) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_translation(to_rapier_vec(pos), true);
            rb.set_rotation(to_rapier_quat(rot), true);
        }
    }

    fn get_body_velocity(&self, handle: RigidBodyHandle) -> Vec3 {
        self.rigid_body_set
            .get(unpack_body(handle))
            .map_or(Vec3::ZERO, |rb| from_rapier_vec(rb.linvel()))
    }

    fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_linvel(to_rapier_vec(velocity), true);
        }
    }

    fn set_body_force(&mut self, handle: RigidBodyHandle, force: Vec3) {
        if let Some(rb) = self.body_mut(handle) {
            rb.reset_forces(false);
            rb.add_force(to_rapier_vec(force), true);
        }
    }

    fn set_body_type(&mut self, handle: RigidBodyHandle, body_type: BodyType) {
        if let Some(rb) = self.body_mut(handle) {
            rb.set_body_type(rapier_body_type(body_type), true);
            if body_type != BodyType::Dynamic {
                rb.reset_forces(false);
                rb.set_linvel(Vector::zeros(), false);
            }
        }
    }

    fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}
