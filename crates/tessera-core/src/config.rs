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

//! Configuration for an assembly run.
//!
//! Every section has serde defaults, so a RON document only needs to name
//! the values it overrides:
//!
//! ```
//! use tessera_core::config::{AllocationStrategy, AssemblyConfig};
//!
//! let config = AssemblyConfig::from_ron_str(
//!     "(drone_count: 8, allocation: (strategy: Centralized))",
//! ).unwrap();
//! assert_eq!(config.drone_count, 8);
//! assert_eq!(config.allocation.strategy, AllocationStrategy::Centralized);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::math::Vec3;

/// How the resolver treats cells it cannot reach by support expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IslandPolicy {
    /// Drop every stalled cell and log it as unsupported.
    #[default]
    Drop,
    /// Place the lowest stalled level outright and resume expansion.
    /// Lossy: such cells carry no physical support.
    ///
    /// Relaxed cells become unsupported slots, and every slot resting on them
    /// is unreachable, so this builds nothing more than [`IslandPolicy::Drop`].
    /// It only keeps the stranded cells visible in the slot graph.
    PlaceLowestLayer,
}

/// Which task allocation lane drives slot claiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AllocationStrategy {
    /// One greedy assignment pass over all free drones every tick.
    Centralized,
    /// Each drone polls the shared slot state on its own throttled schedule.
    #[default]
    Decentralized,
}

/// Mapping between grid cells and world space.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Edge length of one cube in world units.
    pub cell_size: f32,
    /// Added to every slot position after scaling.
    pub ground_offset: Vec3,
    /// Centre the grid on the x/z bounding box of each build request.
    pub center_on_placements: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            ground_offset: Vec3::new(0.0, 0.5, 0.0),
            center_on_placements: true,
        }
    }
}

/// Steering and locking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Cruise speed in units per second.
    pub max_speed: f32,
    /// Maximum change of velocity per second for kinematic motion.
    pub max_acceleration: f32,
    /// Distance under which a drone snaps onto its claimed slot.
    pub lock_distance: f32,
    /// Horizontal distance under which height is no longer clamped to the surface.
    pub approach_radius: f32,
    /// Distance over which a drone slows down when arriving.
    pub arrival_radius: f32,
    /// Radius of the separation neighbourhood.
    pub separation_radius: f32,
    /// Weight of the separation term relative to the goal term.
    pub separation_strength: f32,
    /// Height kept above the local surface while travelling.
    pub hover_clearance: f32,
    /// Gain of the damped steering force when physics drives motion.
    pub steering_gain: f32,
    /// Mass of a drone body.
    pub drone_mass: f32,
    /// Linear damping applied to drone bodies.
    pub linear_damping: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            max_acceleration: 16.0,
            lock_distance: 0.15,
            approach_radius: 1.5,
            arrival_radius: 1.0,
            separation_radius: 1.2,
            separation_strength: 1.0,
            hover_clearance: 1.0,
            steering_gain: 8.0,
            drone_mass: 1.0,
            linear_damping: 0.5,
        }
    }
}

/// Task allocation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationSettings {
    /// Strategy lane used by the driver.
    pub strategy: AllocationStrategy,
    /// Ticks between two decisions of the same drone (decentralized only).
    pub decision_interval_ticks: u32,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::default(),
            decision_interval_ticks: 10,
        }
    }
}

/// Parking region for drones without a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Centre of the parking disc.
    pub center: Vec3,
    /// Radius of the parking disc.
    pub radius: f32,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 0.5, -12.0),
            radius: 4.0,
        }
    }
}

/// Physics integration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Fixed sub-steps per outer tick.
    pub substeps: u32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self { substeps: 4 }
    }
}

/// Complete configuration of an assembly driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Size of the fixed drone pool.
    pub drone_count: usize,
    /// Grid to world mapping.
    pub grid: GridSettings,
    /// Steering and locking.
    pub motion: MotionSettings,
    /// Task allocation.
    pub allocation: AllocationSettings,
    /// Parking hub.
    pub hub: HubSettings,
    /// Physics sub-stepping.
    pub physics: PhysicsSettings,
    /// Resolver stall policy.
    pub island_policy: IslandPolicy,
    /// Smoothing rate (1/s) of the structure transform.
    pub transform_smoothing: f32,
    /// Seed for parking positions.
    pub seed: u64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            drone_count: 50,
            grid: GridSettings::default(),
            motion: MotionSettings::default(),
            allocation: AllocationSettings::default(),
            hub: HubSettings::default(),
            physics: PhysicsSettings::default(),
            island_policy: IslandPolicy::default(),
            transform_smoothing: 6.0,
            seed: 0x7e55_e7a0,
        }
    }
}

impl AssemblyConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading assembly config from {}", path.as_ref().display());
        Self::from_ron_str(&source)
    }

    /// Checks every value against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid.cell_size", self.grid.cell_size),
            ("motion.max_speed", self.motion.max_speed),
            ("motion.max_acceleration", self.motion.max_acceleration),
            ("motion.lock_distance", self.motion.lock_distance),
            ("motion.separation_radius", self.motion.separation_radius),
            ("motion.drone_mass", self.motion.drone_mass),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(field, format!("must be > 0, got {value}")));
            }
        }

        let non_negative = [
            ("motion.arrival_radius", self.motion.arrival_radius),
            ("motion.separation_strength", self.motion.separation_strength),
            ("motion.hover_clearance", self.motion.hover_clearance),
            ("motion.steering_gain", self.motion.steering_gain),
            ("motion.linear_damping", self.motion.linear_damping),
            ("hub.radius", self.hub.radius),
            ("transform_smoothing", self.transform_smoothing),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")));
            }
        }

        if self.motion.approach_radius < self.motion.lock_distance {
            return Err(ConfigError::invalid(
                "motion.approach_radius",
                "must not be smaller than motion.lock_distance",
            ));
        }
        if self.allocation.decision_interval_ticks == 0 {
            return Err(ConfigError::invalid(
                "allocation.decision_interval_ticks",
                "must be at least 1",
            ));
        }
        if self.physics.substeps == 0 {
            return Err(ConfigError::invalid("physics.substeps", "must be at least 1"));
        }
        if !(self.grid.ground_offset.is_finite() && self.hub.center.is_finite()) {
            return Err(ConfigError::invalid("grid.ground_offset", "must be finite"));
        }
        Ok(())
    }

    /// Serializes the configuration as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AssemblyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = AssemblyConfig::from_ron_str("(motion: (max_speed: 2.5))").unwrap();
        assert_eq!(config.motion.max_speed, 2.5);
        assert_eq!(config.motion.lock_distance, MotionSettings::default().lock_distance);
        assert_eq!(config.island_policy, IslandPolicy::Drop);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AssemblyConfig::from_ron_str("(grid: (cell_size: 0.0))").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "grid.cell_size",
                ..
            }
        ));

        let err =
            AssemblyConfig::from_ron_str("(allocation: (decision_interval_ticks: 0))").unwrap_err();
        assert!(err.to_string().contains("decision_interval_ticks"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = AssemblyConfig::from_ron_str("(drone_count: \"many\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_ron_round_trip_preserves_policy() {
        let mut config = AssemblyConfig::default();
        config.island_policy = IslandPolicy::PlaceLowestLayer;
        let text = config.to_ron_string().unwrap();
        let back = AssemblyConfig::from_ron_str(&text).unwrap();
        assert_eq!(back.island_policy, IslandPolicy::PlaceLowestLayer);
    }
}
