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

//! Mobile drones of the assembly swarm.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tessera_core::math::{Quaternion, Vec3};
use tessera_core::physics::RigidBodyHandle;

use crate::slot::SlotId;

/// Identifier of a drone; equal to its index in the pool.
pub type DroneId = usize;

/// Motion state of a drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DroneState {
    /// No task; holding in the hub.
    #[default]
    Parking,
    /// Travelling to its claimed slot.
    MovingToSlot,
    /// Locked into a filled slot until the next reset.
    Attached,
}

/// Opaque appearance hint for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualState {
    /// Parking.
    Idle,
    /// Moving to a slot.
    Moving,
    /// Part of the structure.
    Attached,
}

/// A single drone.
///
/// The drone holds the only link between itself and a slot (`claim`); slots
/// never point back at drones.
#[derive(Debug, Clone, PartialEq)]
pub struct Drone {
    /// Index in the pool.
    pub id: DroneId,
    /// World-space position.
    pub position: Vec3,
    /// World-space velocity.
    pub velocity: Vec3,
    /// World-space orientation.
    pub orientation: Quaternion,
    /// Current motion state.
    pub state: DroneState,
    /// Slot this drone is travelling to or attached at.
    pub claim: Option<SlotId>,
    /// Holding position inside the hub while parking.
    pub parking_target: Vec3,
    /// Slot position in structure space once attached.
    pub base_position: Vec3,
    /// Dynamics body, when a physics provider drives motion.
    pub body: Option<RigidBodyHandle>,
}

impl Drone {
    /// A parking drone at `position`, holding there.
    pub fn new(id: DroneId, position: Vec3) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            orientation: Quaternion::IDENTITY,
            state: DroneState::Parking,
            claim: None,
            parking_target: position,
            base_position: position,
            body: None,
        }
    }

    /// `true` if the drone can take a new task.
    pub fn is_free(&self) -> bool {
        self.state == DroneState::Parking
    }

    /// `true` while travelling to a slot.
    pub fn is_moving(&self) -> bool {
        self.state == DroneState::MovingToSlot
    }

    /// `true` once locked into the structure.
    pub fn is_attached(&self) -> bool {
        self.state == DroneState::Attached
    }

    /// Starts travelling to `slot`.
    pub fn claim(&mut self, slot: SlotId) {
        self.claim = Some(slot);
        self.state = DroneState::MovingToSlot;
    }

    /// Locks onto the claimed slot.
    ///
    /// `world` is where the slot currently sits, `base` its structure-space
    /// position.
    pub fn attach(&mut self, world: Vec3, base: Vec3, orientation: Quaternion) {
        self.position = world;
        self.base_position = base;
        self.orientation = orientation;
        self.velocity = Vec3::ZERO;
        self.state = DroneState::Attached;
    }

    /// Drops any task and heads for `parking_target`.
    pub fn park(&mut self, parking_target: Vec3) {
        self.claim = None;
        self.state = DroneState::Parking;
        self.parking_target = parking_target;
        self.base_position = self.position;
    }

    /// Appearance hint for the current state.
    pub fn visual_state(&self) -> VisualState {
        match self.state {
            DroneState::Parking => VisualState::Idle,
            DroneState::MovingToSlot => VisualState::Moving,
            DroneState::Attached => VisualState::Attached,
        }
    }
}

/// Slots currently claimed by any drone in the pool.
pub fn claimed_slots(drones: &[Drone]) -> HashSet<SlotId> {
    drones.iter().filter_map(|d| d.claim).collect()
}
