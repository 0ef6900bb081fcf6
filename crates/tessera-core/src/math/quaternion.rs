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

//! Unit quaternions for slot and drone orientation.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

use super::{Vec3, EPSILON};

/// Represents a rotation in 3D space using a quaternion.
///
/// Stored as `(x, y, z, w)`, where `[x, y, z]` is the vector part and `w` the
/// scalar part. Rotations should be unit quaternions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Quaternion {
    /// The x component of the vector part.
    pub x: f32,
    /// The y component of the vector part.
    pub y: f32,
    /// The z component of the vector part.
    pub z: f32,
    /// The scalar (real) part.
    pub w: f32,
}

impl Quaternion {
    /// The identity quaternion, representing no rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Creates a new quaternion from its raw components.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a quaternion representing a rotation around `axis` by `angle_radians`.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let axis = axis.normalize_or_zero();
        let (s, c) = (angle_radians * 0.5).sin_cos();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: c,
        }
    }

    /// Creates a rotation about the +Y axis. A zero angle yields exactly [`Self::IDENTITY`].
    #[inline]
    pub fn from_rotation_y(angle_radians: f32) -> Self {
        if angle_radians == 0.0 {
            return Self::IDENTITY;
        }
        Self::from_axis_angle(Vec3::Y, angle_radians)
    }

    /// Calculates the magnitude of the quaternion.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.dot(*self).sqrt()
    }

    /// Returns a normalized version of this quaternion, or identity for degenerate input.
    #[inline]
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > EPSILON {
            let inv = 1.0 / mag;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Computes the dot product of two quaternions.
    #[inline]
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Rotates a 3D vector by this quaternion.
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let s = self.w;
        2.0 * u.dot(v) * u + (s * s - u.dot(u)) * v + 2.0 * s * u.cross(v)
    }
}

impl Default for Quaternion {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;
    /// Combines two rotations using the Hamilton product (`self` applied after `rhs`).
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rotation_y_matches_vector_rotation() {
        let angle = 0.7;
        let q = Quaternion::from_rotation_y(angle);
        let v = Vec3::new(1.0, 2.0, -3.0);
        assert_abs_diff_eq!(q.rotate_vec3(v), v.rotate_y(angle), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_yaw_is_identity() {
        assert_eq!(Quaternion::from_rotation_y(0.0), Quaternion::IDENTITY);
    }

    #[test]
    fn test_composition_adds_angles() {
        let a = Quaternion::from_rotation_y(FRAC_PI_2);
        let b = Quaternion::from_rotation_y(FRAC_PI_2);
        let v = (a * b).rotate_vec3(Vec3::X);
        assert_abs_diff_eq!(v, -Vec3::X, epsilon = 1e-5);
    }
}
