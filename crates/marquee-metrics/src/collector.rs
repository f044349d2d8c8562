// Copyright 2025 Marquee Authors
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

use crate::registry::{Counter, MetricsRegistry, Operation};
use crate::snapshot::{MetricsSnapshot, ServerInfo};
use std::sync::Arc;
use std::time::Instant;

/// Trait for metrics collection in Marquee services.
///
/// Components receive a collector as an injected `Arc<dyn MetricsCollector>`
/// rather than reaching for a global, so tests can hand each instance its
/// own registry.
///
/// # Example
///
/// ```rust
/// use marquee_metrics::{MetricsCollector, Operation, ServiceMetricsCollector};
/// use std::time::Instant;
///
/// let collector = ServiceMetricsCollector::new();
///
/// let start = Instant::now();
/// // ... serve a rating summary ...
/// collector.record_call(Operation::RatingRequest, start, true);
///
/// assert_eq!(collector.snapshot().total_requests, 1);
/// ```
pub trait MetricsCollector: Send + Sync {
    /// Records a completed call with its outcome and latency.
    ///
    /// # Arguments
    /// * `operation` - The operation that ran
    /// * `start_time` - When the call began (for latency calculation)
    /// * `success` - `true` if the call succeeded
    fn record_call(&self, operation: Operation, start_time: Instant, success: bool);

    /// Bumps an event counter by one.
    fn increment(&self, counter: Counter);

    /// Takes a snapshot of the current metrics state.
    fn snapshot(&self) -> MetricsSnapshot;

    /// Service identity and uptime for `/__info`.
    fn info(&self) -> ServerInfo;
}

/// Registry-backed collector used by the review service.
pub struct ServiceMetricsCollector {
    registry: Arc<MetricsRegistry>,
}

impl ServiceMetricsCollector {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Creates a collector over an existing registry.
    ///
    /// Useful when a test wants to inspect the registry directly.
    pub fn with_registry(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }
}

impl Default for ServiceMetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector for ServiceMetricsCollector {
    fn record_call(&self, operation: Operation, start_time: Instant, success: bool) {
        let latency_us = start_time.elapsed().as_micros() as u64;
        self.registry.record(operation, latency_us, success);
    }

    fn increment(&self, counter: Counter) {
        self.registry.increment(counter);
    }

    fn snapshot(&self) -> MetricsSnapshot {
        self.registry.snapshot()
    }

    fn info(&self) -> ServerInfo {
        ServerInfo::new(self.registry.uptime_ms())
    }
}
