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

//! Acts as the **[A]gent** for swarm assembly.
//!
//! One tick runs a decide phase and a move phase over the whole pool:
//!
//! 1. the selected allocation lane hands available slots to free drones;
//! 2. the structure transform eases toward its target;
//! 3. the steering lane computes desired velocities;
//! 4. the motion lane integrates them, through the physics provider when one
//!    is attached;
//! 5. drones close enough to their slot lock in, fill it and unlock the slots
//!    that depend on it;
//! 6. attached drones are re-placed through the current structure transform.
//!
//! New builds and scatters drop every claim at once; nothing is rolled back.

mod agent;

pub use agent::*;
