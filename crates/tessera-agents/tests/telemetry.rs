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

use anyhow::Result;
use tessera_agents::AssemblyAgent;
use tessera_core::config::AllocationSettings;
use tessera_core::telemetry::MetricId;
use tessera_core::{AllocationStrategy, AssemblyConfig, GridCoord};
use tessera_telemetry::MetricsRegistry;

fn gauge(registry: &MetricsRegistry, name: &str) -> f64 {
    registry
        .get_metric(&MetricId::new("assembly", name))
        .map(|m| m.value.as_f64())
        .unwrap_or(f64::NAN)
}

#[test]
fn test_assembly_gauges_track_progress() -> Result<()> {
    let registry = MetricsRegistry::new();
    let mut agent = AssemblyAgent::new(AssemblyConfig {
        drone_count: 4,
        allocation: AllocationSettings {
            strategy: AllocationStrategy::Centralized,
            decision_interval_ticks: 1,
        },
        ..AssemblyConfig::default()
    })?
    .with_telemetry(&registry)?;
    assert_eq!(registry.get_namespace_metrics("assembly").len(), 7);

    agent.build(&[GridCoord::new(0, 0, 0), GridCoord::new(0, 1, 0)])?;
    assert_eq!(gauge(&registry, "slots_available"), 1.0);
    assert_eq!(gauge(&registry, "fraction_complete"), 0.0);

    agent.tick(1.0 / 30.0);
    assert_eq!(gauge(&registry, "drones_moving"), 1.0);
    assert!(gauge(&registry, "tick_time_ms") >= 0.0);

    for _ in 0..3000 {
        agent.tick(1.0 / 30.0);
        if agent.graph().is_complete() {
            break;
        }
    }
    assert_eq!(gauge(&registry, "slots_filled"), 2.0);
    assert_eq!(gauge(&registry, "drones_attached"), 2.0);
    assert_eq!(gauge(&registry, "fraction_complete"), 1.0);
    assert_eq!(gauge(&registry, "slot_fills"), 2.0);
    Ok(())
}

#[test]
fn test_reregistration_resets_shared_registry() -> Result<()> {
    let registry = MetricsRegistry::new();
    let mut first = AssemblyAgent::new(AssemblyConfig::default())?.with_telemetry(&registry)?;
    first.build(&[GridCoord::new(0, 0, 0), GridCoord::new(1, 0, 0)])?;
    assert_eq!(gauge(&registry, "slots_available"), 2.0);

    let _second = AssemblyAgent::new(AssemblyConfig::default())?.with_telemetry(&registry)?;
    assert_eq!(registry.metric_count(), 7);
    assert_eq!(gauge(&registry, "slots_available"), 0.0);
    Ok(())
}
