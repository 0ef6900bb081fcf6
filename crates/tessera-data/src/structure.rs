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

//! Rigid transform applied to the assembled structure as a whole.

use serde::{Deserialize, Serialize};
use tessera_core::math::{Quaternion, Vec3, EPSILON};

/// Target and smoothed current offset plus yaw of the structure.
///
/// Attached drones keep their structure-space base position; their world
/// position is `rotate_y(yaw)(base) + offset`, a yaw about +Y through the
/// world origin followed by the offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StructureTransform {
    target_offset: Vec3,
    target_yaw: f32,
    current_offset: Vec3,
    current_yaw: f32,
}

impl StructureTransform {
    /// The identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the target offset by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        self.target_offset += delta;
    }

    /// Turns the target yaw by `angle` radians.
    pub fn rotate_y(&mut self, angle: f32) {
        self.target_yaw += angle;
    }

    /// Sets the target back to identity; the current value eases back.
    pub fn reset(&mut self) {
        self.target_offset = Vec3::ZERO;
        self.target_yaw = 0.0;
    }

    /// Drops both target and current value to identity at once.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Eases the current value toward the target.
    ///
    /// Exponential smoothing at `rate` per second; a non-positive rate snaps.
    /// Returns `true` if the current value changed.
    pub fn advance(&mut self, dt: f32, rate: f32) -> bool {
        if self.is_settled() {
            return false;
        }
        let alpha = if rate <= 0.0 {
            1.0
        } else {
            1.0 - (-rate * dt.max(0.0)).exp()
        };
        self.current_offset = Vec3::lerp(self.current_offset, self.target_offset, alpha);
        self.current_yaw += (self.target_yaw - self.current_yaw) * alpha;

        if self.current_offset.distance(self.target_offset) < EPSILON {
            self.current_offset = self.target_offset;
        }
        if (self.current_yaw - self.target_yaw).abs() < EPSILON {
            self.current_yaw = self.target_yaw;
        }
        true
    }

    /// `true` when the current value equals the target.
    pub fn is_settled(&self) -> bool {
        self.current_offset == self.target_offset && self.current_yaw == self.target_yaw
    }

    /// `true` when the current value is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.current_offset == Vec3::ZERO && self.current_yaw == 0.0
    }

    /// Current offset.
    pub fn offset(&self) -> Vec3 {
        self.current_offset
    }

    /// Current yaw in radians.
    pub fn yaw(&self) -> f32 {
        self.current_yaw
    }

    /// Target offset.
    pub fn target_offset(&self) -> Vec3 {
        self.target_offset
    }

    /// Target yaw in radians.
    pub fn target_yaw(&self) -> f32 {
        self.target_yaw
    }

    /// Maps a structure-space point to world space.
    pub fn apply(&self, base: Vec3) -> Vec3 {
        if self.is_identity() {
            return base;
        }
        base.rotate_y(self.current_yaw) + self.current_offset
    }

    /// Maps a world-space point back to structure space.
    pub fn inverse_apply(&self, world: Vec3) -> Vec3 {
        if self.is_identity() {
            return world;
        }
        (world - self.current_offset).rotate_y(-self.current_yaw)
    }

    /// Maps a structure-space orientation to world space.
    pub fn apply_orientation(&self, base: Quaternion) -> Quaternion {
        if self.current_yaw == 0.0 {
            return base;
        }
        Quaternion::from_rotation_y(self.current_yaw) * base
    }
}
