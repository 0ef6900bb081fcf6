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

use rapier3d::na::{Quaternion, UnitQuaternion, Vector3};
use rapier3d::prelude::Real;
use tessera_core::math::{Quat, Vec3};
use tessera_core::physics::{ColliderHandle, RigidBodyHandle};

pub fn to_rapier_vec(v: Vec3) -> Vector3<Real> {
    Vector3::new(v.x, v.y, v.z)
}

pub fn from_rapier_vec(v: &Vector3<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_rapier_quat(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn from_rapier_quat(q: &UnitQuaternion<Real>) -> Quat {
    Quat::new(q.i, q.j, q.k, q.w)
}

// Handles carry the arena index in the low and the generation in the high half.

pub fn pack_body(handle: rapier3d::dynamics::RigidBodyHandle) -> RigidBodyHandle {
    let (index, generation) = handle.into_raw_parts();
    RigidBodyHandle(u64::from(generation) << 32 | u64::from(index))
}

pub fn unpack_body(handle: RigidBodyHandle) -> rapier3d::dynamics::RigidBodyHandle {
    rapier3d::dynamics::RigidBodyHandle::from_raw_parts(handle.0 as u32, (handle.0 >> 32) as u32)
}

pub fn pack_collider(handle: rapier3d::geometry::ColliderHandle) -> ColliderHandle {
    let (index, generation) = handle.into_raw_parts();
    ColliderHandle(u64::from(generation) << 32 | u64::from(index))
}
