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

//! Registry for managing metrics.

use std::sync::Arc;

use tessera_core::telemetry::{Metric, MetricId, MetricType, MetricsError, MetricsResult};

use crate::storage::backend::MetricsBackend;
use crate::storage::memory_backend::InMemoryBackend;

/// Central entry point for registering and reading metrics.
///
/// Registration returns a cheap, cloneable handle bound to the same backend.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    backend: Arc<dyn MetricsBackend>,
}

impl MetricsRegistry {
    /// Create a registry with the default in-memory backend
    pub fn new() -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::new()),
        }
    }

    /// Create a registry with a custom backend
    pub fn with_backend(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    /// Register a counter starting at zero
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> MetricsResult<CounterHandle> {
        let id = MetricId::new(namespace, name);
        self.backend
            .put_metric(Metric::new_counter(id.clone(), description, 0))?;
        Ok(CounterHandle {
            id,
            backend: self.backend.clone(),
        })
    }

    /// Register a gauge starting at zero
    pub fn register_gauge(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> MetricsResult<GaugeHandle> {
        let id = MetricId::new(namespace, name);
        self.backend
            .put_metric(Metric::new_gauge(id.clone(), description, unit, 0.0))?;
        Ok(GaugeHandle {
            id,
            backend: self.backend.clone(),
        })
    }

    /// Get a metric by ID
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        self.backend.get_metric(id)
    }

    /// Get all metrics in a namespace
    pub fn get_namespace_metrics(&self, namespace: &str) -> Vec<Metric> {
        if let Some(memory) = self.backend.as_any().downcast_ref::<InMemoryBackend>() {
            memory.get_metrics_by_namespace(namespace)
        } else {
            self.backend
                .list_all_metrics()
                .into_iter()
                .filter(|m| m.id.namespace == namespace)
                .collect()
        }
    }

    /// Total number of metrics
    pub fn metric_count(&self) -> usize {
        self.backend.metric_count()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for counter operations
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl CounterHandle {
    /// Increment the counter by 1
    pub fn increment(&self) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, 1)
    }

    /// Increment the counter by `amount`
    pub fn increment_by(&self, amount: u64) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, amount)
    }

    /// Current counter value
    pub fn get(&self) -> MetricsResult<u64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_counter()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            })
    }

    /// The metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for gauge operations
#[derive(Debug, Clone)]
pub struct GaugeHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl GaugeHandle {
    /// Set the gauge
    pub fn set(&self, value: f64) -> MetricsResult<()> {
        self.backend.set_gauge(&self.id, value)
    }

    /// Current gauge value
    pub fn get(&self) -> MetricsResult<f64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_gauge()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            })
    }

    /// The metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_handle() {
        let registry = MetricsRegistry::new();
        let fills = registry
            .register_counter("assembly", "slot_fills", "Slots filled")
            .unwrap();
        fills.increment().unwrap();
        assert_eq!(fills.increment_by(4).unwrap(), 5);
        assert_eq!(fills.get().unwrap(), 5);
        assert_eq!(fills.id().to_string(), "assembly:slot_fills");
    }

    #[test]
    fn test_gauge_handle_and_namespace_query() {
        let registry = MetricsRegistry::new();
        let gauge = registry
            .register_gauge("assembly", "fraction_complete", "Filled share", "ratio")
            .unwrap();
        registry
            .register_gauge("motion", "tick_time_ms", "Tick time", "ms")
            .unwrap();
        gauge.set(0.25).unwrap();
        assert_eq!(gauge.get().unwrap(), 0.25);
        assert_eq!(registry.metric_count(), 2);
        assert_eq!(registry.get_namespace_metrics("assembly").len(), 1);
    }

    #[test]
    fn test_clones_share_backend() {
        let registry = MetricsRegistry::new();
        let shared = registry.clone();
        shared.register_counter("a", "b", "c").unwrap();
        assert_eq!(registry.metric_count(), 1);
    }
}
