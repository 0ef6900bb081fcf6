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

//! # Tessera Agents
//!
//! Agents own state and decide which lanes run over it. The
//! [`AssemblyAgent`](assembly_agent::AssemblyAgent) is the single driver of a
//! swarm assembly: it owns the slot graph, the drone pool and the structure
//! transform, and hands them explicitly to the lanes on every tick.

#![warn(missing_docs)]

pub mod assembly_agent;

pub use assembly_agent::{AssemblyAgent, TickReport};
