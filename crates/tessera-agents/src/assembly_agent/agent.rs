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

//! Defines the AssemblyAgent, the single driver of a swarm assembly.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tessera_core::config::{AssemblyConfig, HubSettings};
use tessera_core::lane::{Lane, LaneWorkload};
use tessera_core::math::{Quaternion, Vec3, TAU};
use tessera_core::physics::{
    BodyType, ColliderDesc, ColliderShape, PhysicsProvider, RigidBodyDesc,
};
use tessera_core::{AllocationStrategy, AssemblyError, GridCoord};
use tessera_data::{
    AssemblyStats, Drone, GridFrame, Resolution, Slot, SlotGraph, SlotState, StructureTransform,
    VisualState,
};
use tessera_lanes::{
    AllocationLane, CentralizedAllocationLane, DecentralizedAllocationLane, GraphLane,
    KinematicMotionLane, MotionContext, MotionLane, OrderingLane, PhysicsMotionLane,
    SlotGraphLane, SteeringContext, SteeringLane, SupportOrderLane, SwarmSteeringLane,
};
use tessera_telemetry::{CounterHandle, GaugeHandle, MetricsRegistry};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Index of the tick that ran.
    pub tick: u64,
    /// Slots claimed in the decide phase.
    pub claims: usize,
    /// Slots filled in the move phase.
    pub fills: usize,
}

/// Holds telemetry handles for the assembly.
struct AssemblyMetrics {
    slots_available: GaugeHandle,
    slots_filled: GaugeHandle,
    drones_moving: GaugeHandle,
    drones_attached: GaugeHandle,
    fraction_complete: GaugeHandle,
    tick_time_ms: GaugeHandle,
    slot_fills: CounterHandle,
}

fn find_lane<'a, L: Lane + ?Sized>(lanes: &'a [Box<L>], name: &str) -> Option<&'a L> {
    lanes
        .iter()
        .find(|lane| lane.strategy_name() == name)
        .map(|boxed| boxed.as_ref())
}

/// A uniformly distributed point in the hub disc.
fn parking_spot(rng: &mut StdRng, hub: &HubSettings) -> Vec3 {
    let r = hub.radius * rng.random::<f32>().sqrt();
    let theta = rng.random::<f32>() * TAU;
    hub.center + Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
}

/// The agent driving a swarm assembly.
///
/// It owns the slot graph, the drone pool and the structure transform, and
/// passes them explicitly to its lanes. The only shared mutable state, slot
/// claims, lives on the drones and is re-scanned by every allocation pass.
pub struct AssemblyAgent {
    config: AssemblyConfig,
    graph: SlotGraph,
    drones: Vec<Drone>,
    transform: StructureTransform,
    ordering: Box<dyn OrderingLane>,
    graph_lane: Box<dyn GraphLane>,
    allocation_lanes: Vec<Box<dyn AllocationLane>>,
    strategy: AllocationStrategy,
    steering: Box<dyn SteeringLane>,
    motion_lanes: Vec<Box<dyn MotionLane>>,
    physics: Option<Box<dyn PhysicsProvider>>,
    rng: StdRng,
    tick: u64,
    metrics: Option<AssemblyMetrics>,
}

impl AssemblyAgent {
    /// Creates an agent with a parked drone pool and no slots.
    pub fn new(config: AssemblyConfig) -> Result<Self, AssemblyError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let drones = (0..config.drone_count)
            .map(|id| Drone::new(id, parking_spot(&mut rng, &config.hub)))
            .collect();

        let allocation_lanes: Vec<Box<dyn AllocationLane>> = vec![
            Box::new(CentralizedAllocationLane::new()),
            Box::new(DecentralizedAllocationLane::new(
                config.allocation.decision_interval_ticks,
            )),
        ];
        let motion_lanes: Vec<Box<dyn MotionLane>> = vec![
            Box::new(KinematicMotionLane::new()),
            Box::new(PhysicsMotionLane::new(config.physics.substeps)),
        ];

        log::info!(
            "Assembly agent ready with {} drone(s), {:?} allocation",
            config.drone_count,
            config.allocation.strategy
        );

        Ok(Self {
            ordering: Box::new(SupportOrderLane::new(config.island_policy)),
            graph_lane: Box::new(SlotGraphLane::new()),
            allocation_lanes,
            strategy: config.allocation.strategy,
            steering: Box::new(SwarmSteeringLane::new()),
            motion_lanes,
            graph: SlotGraph::empty(),
            drones,
            transform: StructureTransform::new(),
            physics: None,
            rng,
            tick: 0,
            metrics: None,
            config,
        })
    }

    /// Drives drone motion through `provider` from now on.
    ///
    /// Every drone gets a gravity-free dynamics body with a sphere collider.
    pub fn with_physics(mut self, mut provider: Box<dyn PhysicsProvider>) -> Self {
        let motion = &self.config.motion;
        let radius = self.config.grid.cell_size * 0.4;
        for drone in &mut self.drones {
            let body = provider.add_body(RigidBodyDesc {
                position: drone.position,
                rotation: drone.orientation,
                body_type: if drone.is_attached() {
                    BodyType::Kinematic
                } else {
                    BodyType::Dynamic
                },
                linear_velocity: drone.velocity,
                mass: motion.drone_mass,
                linear_damping: motion.linear_damping,
                gravity_scale: 0.0,
            });
            provider.add_collider(ColliderDesc {
                parent_body: Some(body),
                position: Vec3::ZERO,
                shape: ColliderShape::Sphere(radius),
            });
            drone.body = Some(body);
        }
        log::debug!("Attached physics provider with {} bodies", provider.body_count());
        self.physics = Some(provider);
        self
    }

    /// Attaches a metrics registry to the agent for observability.
    pub fn with_telemetry(mut self, registry: &MetricsRegistry) -> Result<Self, AssemblyError> {
        let metrics = AssemblyMetrics {
            slots_available: registry.register_gauge(
                "assembly",
                "slots_available",
                "Slots ready to be claimed",
                "count",
            )?,
            slots_filled: registry.register_gauge(
                "assembly",
                "slots_filled",
                "Slots occupied by a drone",
                "count",
            )?,
            drones_moving: registry.register_gauge(
                "assembly",
                "drones_moving",
                "Drones travelling to a slot",
                "count",
            )?,
            drones_attached: registry.register_gauge(
                "assembly",
                "drones_attached",
                "Drones locked into the structure",
                "count",
            )?,
            fraction_complete: registry.register_gauge(
                "assembly",
                "fraction_complete",
                "Filled share of reachable slots",
                "ratio",
            )?,
            tick_time_ms: registry.register_gauge(
                "assembly",
                "tick_time_ms",
                "Time spent in one tick",
                "ms",
            )?,
            slot_fills: registry.register_counter(
                "assembly",
                "slot_fills",
                "Slots filled since start",
            )?,
        };
        self.metrics = Some(metrics);
        self.publish_metrics(None, 0);
        Ok(self)
    }

    // --- Commands ---

    /// Resolves, positions and starts building `placements`.
    ///
    /// Returns the resolver output so callers can inspect dropped or relaxed cells.
    pub fn build(&mut self, placements: &[GridCoord]) -> Result<Resolution, AssemblyError> {
        let resolution = self.ordering.resolve(placements);
        let frame = self.frame_for(&resolution);
        let graph = self.graph_lane.build(&resolution.ordered, frame)?;
        self.set_slots(graph);
        Ok(resolution)
    }

    /// Starts a new build over `graph`, dropping every claim and attachment.
    pub fn set_slots(&mut self, graph: SlotGraph) {
        self.release_all();
        self.transform.clear();

        let reachable = graph.len() - graph.unreachable().count();
        if reachable > self.drones.len() {
            log::warn!(
                "{} reachable slot(s) but only {} drone(s); the structure will be partial",
                reachable,
                self.drones.len()
            );
        }
        log::info!(
            "New build: {} slot(s), {} available",
            graph.len(),
            graph.count(SlotState::Available)
        );
        self.graph = graph;
        self.publish_metrics(None, 0);
    }

    /// Sends every drone back to the hub and clears the slots.
    pub fn scatter(&mut self) {
        self.release_all();
        self.transform.clear();
        self.graph = SlotGraph::empty();
        log::info!("Scattered {} drone(s)", self.drones.len());
        self.publish_metrics(None, 0);
    }

    /// Moves the structure target by `(dx, dy, dz)`.
    pub fn translate_structure(&mut self, dx: f32, dy: f32, dz: f32) {
        self.transform.translate(Vec3::new(dx, dy, dz));
    }

    /// Turns the structure target about +Y by `angle` radians.
    pub fn rotate_structure_y(&mut self, angle: f32) {
        self.transform.rotate_y(angle);
    }

    /// Eases the structure back to its assembled pose.
    pub fn reset_structure_transform(&mut self) {
        self.transform.reset();
    }

    /// Switches the allocation lane used from the next tick on.
    pub fn set_allocation_strategy(&mut self, strategy: AllocationStrategy) {
        if strategy != self.strategy {
            log::info!("Allocation strategy {:?} -> {:?}", self.strategy, strategy);
            self.strategy = strategy;
        }
    }

    // --- Simulation ---

    /// Runs one decide phase and one move phase over the whole pool.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let start = Instant::now();
        let dt = dt.max(0.0);
        let tick = self.tick;
        self.tick += 1;

        let claims = match find_lane(&self.allocation_lanes, self.allocation_lane_name()) {
            Some(lane) => lane.assign(&self.graph, &mut self.drones, &self.transform, tick),
            None => 0,
        };

        self.transform.advance(dt, self.config.transform_smoothing);

        let steering = self.steering.steer(
            &self.drones,
            &SteeringContext {
                graph: &self.graph,
                transform: &self.transform,
                settings: &self.config.motion,
            },
        );

        let motion_name = if self.physics.is_some() {
            "Physics"
        } else {
            "Kinematic"
        };
        if let Some(lane) = find_lane(&self.motion_lanes, motion_name) {
            let physics: Option<&mut dyn PhysicsProvider> = match self.physics.as_mut() {
                Some(provider) => Some(provider.as_mut()),
                None => None,
            };
            let mut ctx = MotionContext {
                settings: &self.config.motion,
                dt,
                physics,
            };
            lane.integrate(&mut self.drones, &steering.velocities, &mut ctx);
        }

        let fills = self.lock_arrivals();
        self.place_attached();

        log::trace!(
            "Tick {}: {} claim(s), {} fill(s), {} pair check(s)",
            tick,
            claims,
            fills,
            steering.pair_checks
        );
        self.publish_metrics(Some(start.elapsed()), fills);
        TickReport {
            tick,
            claims,
            fills,
        }
    }

    fn lock_arrivals(&mut self) -> usize {
        let lock_distance = self.config.motion.lock_distance;
        let mut fills = 0;

        for drone in self.drones.iter_mut().filter(|d| d.is_moving()) {
            let claimed = drone
                .claim
                .and_then(|id| self.graph.get(id))
                .filter(|slot| slot.state == SlotState::Available)
                .map(|slot| (slot.id, slot.position, slot.orientation));
            let Some((id, base, orientation)) = claimed else {
                log::debug!("Drone {} lost its slot claim; returning to hub", drone.id);
                drone.park(parking_spot(&mut self.rng, &self.config.hub));
                continue;
            };

            let target = self.transform.apply(base);
            if drone.position.distance(target) >= lock_distance || !self.graph.fill(id) {
                continue;
            }

            let rotation = self.transform.apply_orientation(orientation);
            drone.attach(target, base, rotation);
            if let (Some(body), Some(provider)) = (drone.body, self.physics.as_mut()) {
                provider.set_body_type(body, BodyType::Kinematic);
                provider.set_body_velocity(body, Vec3::ZERO);
                provider.set_body_transform(body, target, rotation);
            }
            fills += 1;
            log::debug!("Drone {} locked into slot {}", drone.id, id);
        }
        fills
    }

    fn place_attached(&mut self) {
        for drone in self.drones.iter_mut().filter(|d| d.is_attached()) {
            let position = self.transform.apply(drone.base_position);
            let base_rotation = drone
                .claim
                .and_then(|id| self.graph.get(id))
                .map_or(Quaternion::IDENTITY, |slot| slot.orientation);
            let rotation = self.transform.apply_orientation(base_rotation);
            if position == drone.position && rotation == drone.orientation {
                continue;
            }
            drone.position = position;
            drone.orientation = rotation;
            if let (Some(body), Some(provider)) = (drone.body, self.physics.as_mut()) {
                provider.set_body_transform(body, position, rotation);
            }
        }
    }

    fn release_all(&mut self) {
        for drone in &mut self.drones {
            drone.park(parking_spot(&mut self.rng, &self.config.hub));
            if let (Some(body), Some(provider)) = (drone.body, self.physics.as_mut()) {
                provider.set_body_type(body, BodyType::Dynamic);
            }
        }
    }

    fn frame_for(&self, resolution: &Resolution) -> GridFrame {
        let grid = &self.config.grid;
        if grid.center_on_placements {
            GridFrame::centered_on(
                resolution.ordered.iter().map(|p| &p.coord),
                grid.cell_size,
                grid.ground_offset,
            )
        } else {
            GridFrame::new(grid.cell_size, Vec3::ZERO, grid.ground_offset)
        }
    }

    fn publish_metrics(&self, elapsed: Option<Duration>, fills: usize) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        let stats = self.stats();
        let _ = metrics.slots_available.set(stats.slots_available as f64);
        let _ = metrics.slots_filled.set(stats.slots_filled as f64);
        let _ = metrics.drones_moving.set(stats.drones_moving as f64);
        let _ = metrics.drones_attached.set(stats.drones_attached as f64);
        let _ = metrics
            .fraction_complete
            .set(f64::from(stats.fraction_complete));
        if fills > 0 {
            let _ = metrics.slot_fills.increment_by(fills as u64);
        }
        if let Some(elapsed) = elapsed {
            let _ = metrics.tick_time_ms.set(elapsed.as_secs_f64() * 1000.0);
        }
    }

    // --- Queries ---

    /// Strategy name of the allocation lane in use.
    pub fn allocation_lane_name(&self) -> &'static str {
        match self.strategy {
            AllocationStrategy::Centralized => "Centralized",
            AllocationStrategy::Decentralized => "Decentralized",
        }
    }

    /// The allocation lane in use.
    pub fn allocation_lane(&self) -> Option<&dyn AllocationLane> {
        find_lane(&self.allocation_lanes, self.allocation_lane_name())
    }

    /// Current allocation strategy.
    pub fn allocation_strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// Problem size as seen by the lanes.
    pub fn workload(&self) -> LaneWorkload {
        LaneWorkload {
            slots: self.graph.len(),
            drones: self.drones.len(),
            movers: self.drones.iter().filter(|d| d.is_moving()).count(),
        }
    }

    /// Estimated cost of the next allocation pass.
    pub fn estimated_allocation_cost(&self) -> f32 {
        let workload = self.workload();
        self.allocation_lane()
            .map_or(0.0, |lane| lane.estimate_cost(&workload))
    }

    /// The live slot list.
    pub fn slots(&self) -> &[Slot] {
        self.graph.slots()
    }

    /// The live slot graph.
    pub fn graph(&self) -> &SlotGraph {
        &self.graph
    }

    /// The drone pool.
    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    /// Counts per state and completion.
    pub fn stats(&self) -> AssemblyStats {
        AssemblyStats::collect(&self.graph, &self.drones)
    }

    /// Appearance hint per drone, index-aligned with [`drones`](Self::drones).
    pub fn visual_states(&self) -> Vec<VisualState> {
        self.drones.iter().map(Drone::visual_state).collect()
    }

    /// The structure transform.
    pub fn structure_transform(&self) -> &StructureTransform {
        &self.transform
    }

    /// The configuration the agent was created with.
    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// The physics provider, if one drives motion.
    pub fn physics(&self) -> Option<&dyn PhysicsProvider> {
        self.physics.as_deref()
    }
}
