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

use std::fmt::Debug;
use tessera_core::telemetry::{MetricType, Metric, MetricId, MetricValue, MetricsError, MetricsResult};

/// Trait defining the interface for metrics storage backends
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Get a reference to this object as Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Store or replace a metric
    fn put_metric(&self, metric: Metric) -> MetricsResult<()>;

    /// Retrieve a metric by ID
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Check if a metric exists
    fn contains_metric(&self, id: &MetricId) -> bool;

    /// All stored metrics
    fn list_all_metrics(&self) -> Vec<Metric>;

    /// Number of stored metrics
    fn metric_count(&self) -> usize;

    /// Increment a counter by `delta`, returning the new value
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut metric = self.get_metric(id)?;
        match metric.value {
            MetricValue::Counter(ref mut value) => {
                *value = value.saturating_add(delta);
                let result = *value;
                metric.touch();
                self.put_metric(metric)?;
                Ok(result)
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            }),
        }
    }

    /// Set a gauge value
    fn set_gauge(&self, id: &MetricId, value: f64) -> MetricsResult<()> {
        let mut metric = self.get_metric(id)?;
        match metric.value {
            MetricValue::Gauge(ref mut gauge) => {
                *gauge = value;
                metric.touch();
                self.put_metric(metric)
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            }),
        }
    }
}
