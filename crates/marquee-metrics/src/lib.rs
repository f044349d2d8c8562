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

//! Marquee Metrics Collection
//!
//! Thread-safe counters and latency histograms for the review service. The
//! HTTP layer records every inbound operation, the catalog client records
//! every outbound attempt plus breaker events, and the snapshot is served
//! from `/__metrics`.
//!
//! # Architecture
//!
//! - [`MetricsRegistry`]: lock-free storage, one fixed slot per [`Operation`]
//!   and [`Counter`]
//! - [`MetricsCollector`]: the injectable seam components record through
//! - [`MetricsSnapshot`]: serializable view of the current state
//!
//! # Usage Example
//!
//! ```rust
//! use marquee_metrics::{Counter, MetricsCollector, ServiceMetricsCollector};
//!
//! let collector = ServiceMetricsCollector::new();
//! collector.increment(Counter::BreakerRejections);
//! assert_eq!(collector.snapshot().counters["breaker_rejections"], 1);
//! ```

mod collector;
mod registry;
mod snapshot;

pub use collector::{MetricsCollector, ServiceMetricsCollector};
pub use registry::{Counter, MetricsRegistry, Operation};
pub use snapshot::{MetricsSnapshot, OperationMetrics, ServerInfo};
