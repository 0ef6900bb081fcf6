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

//! Provides the small set of 3D math primitives the assembly core needs.
//!
//! All angular functions in this module operate in **radians**.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

// --- Declare Sub-Modules ---

pub mod quaternion;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::quaternion::Quaternion;
pub use self::vector::Vec3;

/// Short alias used by the physics contract.
pub type Quat = Quaternion;

// --- Utility Functions ---

/// Performs an approximate equality comparison between two floats with a custom tolerance.
///
/// # Examples
///
/// ```
/// use tessera_core::math::approx_eq_eps;
/// assert!(approx_eq_eps(0.001, 0.002, 1e-2));
/// assert!(!approx_eq_eps(0.001, 0.002, 1e-4));
/// ```
#[inline]
pub fn approx_eq_eps(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Wraps an angle into the `(-PI, PI]` range.
///
/// # Examples
///
/// ```
/// use tessera_core::math::{wrap_angle, approx_eq_eps, PI};
/// assert!(approx_eq_eps(wrap_angle(3.0 * PI), PI, 1e-4));
/// assert_eq!(wrap_angle(0.5), 0.5);
/// ```
#[inline]
pub fn wrap_angle(radians: f32) -> f32 {
    let mut a = radians % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}
