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

use crate::snapshot::{MetricsSnapshot, OperationMetrics};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Decades covered by the histogram: 1us up to 10s.
const DECADES: usize = 7;
/// Linear steps inside one decade.
const STEPS_PER_DECADE: usize = 10;
const NUM_HISTOGRAM_BINS: usize = DECADES * STEPS_PER_DECADE;

/// An operation whose calls are counted and timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /api/v1/reviews`
    ReviewRequest,
    /// Rating summary reads
    RatingRequest,
    /// Paginated review listings plus has-reviews / count probes
    ReviewsQuery,
    /// Single review by id
    ReviewLookup,
    /// One outbound attempt against the movie catalog
    CatalogCall,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::ReviewRequest,
        Operation::RatingRequest,
        Operation::ReviewsQuery,
        Operation::ReviewLookup,
        Operation::CatalogCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ReviewRequest => "review_request",
            Operation::RatingRequest => "rating_request",
            Operation::ReviewsQuery => "reviews_query",
            Operation::ReviewLookup => "review_lookup",
            Operation::CatalogCall => "catalog_call",
        }
    }

    /// Inbound operations feed the request totals.
    pub fn is_inbound(&self) -> bool {
        !matches!(self, Operation::CatalogCall)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A monotonically increasing event counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Placeholder movies handed out instead of an error
    FallbacksServed,
    /// Catalog calls refused by an open breaker
    BreakerRejections,
    /// Transitions into the OPEN state
    BreakerOpened,
    /// Rating cache updates that failed after a review was saved
    CacheUpdateFailures,
}

impl Counter {
    pub const ALL: [Counter; 4] = [
        Counter::FallbacksServed,
        Counter::BreakerRejections,
        Counter::BreakerOpened,
        Counter::CacheUpdateFailures,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::FallbacksServed => "fallbacks_served",
            Counter::BreakerRejections => "breaker_rejections",
            Counter::BreakerOpened => "breaker_opened",
            Counter::CacheUpdateFailures => "cache_update_failures",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Logarithmic latency histogram.
///
/// Each decade from 1us to 10s is split into ten linear steps, so bin
/// `d * 10 + s` holds samples in `[s * 10^d, (s + 1) * 10^d)`. Samples of
/// 10s and above land in the last bin. Recording is a single relaxed atomic
/// increment per counter.
#[derive(Debug)]
struct LatencyHistogram {
    bins: [AtomicU64; NUM_HISTOGRAM_BINS],
    total_latency: AtomicU64,
    sample_count: AtomicU64,
}

impl LatencyHistogram {
    fn new() -> Self {
        Self {
            bins: std::array::from_fn(|_| AtomicU64::new(0)),
            total_latency: AtomicU64::new(0),
            sample_count: AtomicU64::new(0),
        }
    }

    fn record(&self, latency_us: u64) {
        self.bins[Self::bin_for(latency_us)].fetch_add(1, Ordering::Relaxed);
        self.total_latency.fetch_add(latency_us, Ordering::Relaxed);
        self.sample_count.fetch_add(1, Ordering::Relaxed);
    }

    fn bin_for(latency_us: u64) -> usize {
        if latency_us == 0 {
            return 0;
        }
        let decade = latency_us.ilog10() as usize;
        if decade >= DECADES {
            return NUM_HISTOGRAM_BINS - 1;
        }
        let step = (latency_us / 10u64.pow(decade as u32)) as usize;
        decade * STEPS_PER_DECADE + step.min(STEPS_PER_DECADE - 1)
    }

    /// Lower and upper bound of a bin in microseconds.
    fn bounds(bin: usize) -> (u64, u64) {
        let scale = 10u64.pow((bin / STEPS_PER_DECADE) as u32);
        let step = (bin % STEPS_PER_DECADE) as u64;
        (step * scale, (step + 1) * scale)
    }

    fn percentile(&self, percentile: u64) -> u64 {
        let total = self.sample_count.load(Ordering::Relaxed);
        if total == 0 {
            return 0;
        }
        let target = (total * percentile).div_ceil(100).max(1);
        let mut seen = 0;
        for (bin, counter) in self.bins.iter().enumerate() {
            let count = counter.load(Ordering::Relaxed);
            if count > 0 && seen + count >= target {
                let (low, high) = Self::bounds(bin);
                let fraction = (target - seen) as f64 / count as f64;
                return low + (fraction * (high - low) as f64) as u64;
            }
            seen += count;
        }
        Self::bounds(NUM_HISTOGRAM_BINS - 1).1
    }

    fn average(&self) -> u64 {
        let total = self.sample_count.load(Ordering::Relaxed);
        if total == 0 {
            return 0;
        }
        self.total_latency.load(Ordering::Relaxed) / total
    }
}

#[derive(Debug)]
struct OperationStats {
    call_count: AtomicU64,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    latencies: LatencyHistogram,
}

impl OperationStats {
    fn new() -> Self {
        Self {
            call_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            latencies: LatencyHistogram::new(),
        }
    }

    fn record(&self, latency_us: u64, success: bool) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if success {
            self.success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.latencies.record(latency_us);
    }

    fn snapshot(&self) -> OperationMetrics {
        OperationMetrics {
            call_count: self.call_count.load(Ordering::Relaxed),
            success_count: self.success_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            avg_latency_us: self.latencies.average(),
            p50_latency_us: self.latencies.percentile(50),
            p95_latency_us: self.latencies.percentile(95),
            p99_latency_us: self.latencies.percentile(99),
        }
    }
}

/// Lock-free storage for every tracked operation and counter.
///
/// The operation and counter sets are closed enums, so each gets a fixed
/// slot and no map or lock sits on the hot path. Snapshots are eventually
/// consistent: counters are read one by one with relaxed ordering.
#[derive(Debug)]
pub struct MetricsRegistry {
    operations: [OperationStats; Operation::ALL.len()],
    counters: [AtomicU64; Counter::ALL.len()],
    started_at: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            operations: std::array::from_fn(|_| OperationStats::new()),
            counters: std::array::from_fn(|_| AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    /// Records one completed call.
    ///
    /// # Arguments
    /// * `operation` - Which operation ran
    /// * `latency_us` - Wall time in microseconds
    /// * `success` - Whether the caller got a successful answer
    pub fn record(&self, operation: Operation, latency_us: u64, success: bool) {
        self.operations[operation.index()].record(latency_us, success);
    }

    pub fn increment(&self, counter: Counter) {
        self.counters[counter.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters[counter.index()].load(Ordering::Relaxed)
    }

    pub fn uptime_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let operations: Vec<(Operation, OperationMetrics)> = Operation::ALL
            .iter()
            .map(|op| (*op, self.operations[op.index()].snapshot()))
            .collect();

        let inbound = operations.iter().filter(|(op, _)| op.is_inbound());
        let (mut total, mut ok, mut failed) = (0, 0, 0);
        for (_, m) in inbound {
            total += m.call_count;
            ok += m.success_count;
            failed += m.failure_count;
        }

        MetricsSnapshot {
            total_requests: total,
            successful_requests: ok,
            failed_requests: failed,
            uptime_ms: self.uptime_ms(),
            operations: operations
                .into_iter()
                .map(|(op, m)| (op.as_str().to_string(), m))
                .collect(),
            counters: Counter::ALL
                .iter()
                .map(|c| (c.as_str().to_string(), self.counter(*c)))
                .collect(),
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_operation_tracking() {
        let registry = MetricsRegistry::new();

        registry.record(Operation::ReviewRequest, 100, true);
        registry.record(Operation::ReviewRequest, 200, true);
        registry.record(Operation::ReviewRequest, 50, false);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.successful_requests, 2);
        assert_eq!(snapshot.failed_requests, 1);

        let metrics = &snapshot.operations["review_request"];
        assert_eq!(metrics.call_count, 3);
        assert_eq!(metrics.success_count, 2);
        assert_eq!(metrics.failure_count, 1);
        assert_eq!(metrics.avg_latency_us, 116); // (100 + 200 + 50) / 3
    }

    #[test]
    fn test_catalog_calls_excluded_from_request_totals() {
        let registry = MetricsRegistry::new();
        registry.record(Operation::CatalogCall, 1_000, false);
        registry.record(Operation::RatingRequest, 1_000, true);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.operations["catalog_call"].failure_count, 1);
    }

    #[test]
    fn test_snapshot_lists_every_operation_and_counter() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.operations.len(), Operation::ALL.len());
        assert_eq!(snapshot.counters.len(), Counter::ALL.len());
        assert_eq!(snapshot.counters["fallbacks_served"], 0);
    }

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.increment(Counter::BreakerRejections);
        registry.increment(Counter::BreakerRejections);
        registry.increment(Counter::CacheUpdateFailures);

        assert_eq!(registry.counter(Counter::BreakerRejections), 2);
        assert_eq!(registry.counter(Counter::CacheUpdateFailures), 1);
        assert_eq!(registry.counter(Counter::FallbacksServed), 0);
        assert_eq!(registry.snapshot().counters["breaker_rejections"], 2);
    }

    #[test]
    fn test_percentile_calculation() {
        let registry = MetricsRegistry::new();
        for i in 0..1000 {
            registry.record(Operation::ReviewLookup, i, true);
        }

        let metrics = &registry.snapshot().operations["review_lookup"];
        assert!(metrics.p50_latency_us >= 400 && metrics.p50_latency_us <= 600);
        assert!(metrics.p95_latency_us >= 900 && metrics.p95_latency_us <= 999);
        assert!(metrics.p99_latency_us >= 980 && metrics.p99_latency_us <= 1000);
    }

    #[test]
    fn test_thread_safety() {
        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..1000 {
                        registry.record(Operation::CatalogCall, i, i % 2 == 0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let metrics = &registry.snapshot().operations["catalog_call"];
        assert_eq!(metrics.call_count, 8000);
        assert_eq!(metrics.success_count, 4000);
    }

    // ========================================================================
    // Histogram
    // ========================================================================

    #[test]
    fn test_histogram_empty() {
        let histogram = LatencyHistogram::new();
        assert_eq!(histogram.percentile(50), 0);
        assert_eq!(histogram.average(), 0);
    }

    #[test]
    fn test_histogram_bin_mapping() {
        assert_eq!(LatencyHistogram::bin_for(0), 0);
        assert_eq!(LatencyHistogram::bin_for(7), 7);
        assert_eq!(LatencyHistogram::bin_for(10), 11);
        assert_eq!(LatencyHistogram::bin_for(99), 19);
        assert_eq!(LatencyHistogram::bin_for(450), 24);
        assert_eq!(LatencyHistogram::bin_for(u64::MAX), NUM_HISTOGRAM_BINS - 1);
        assert_eq!(LatencyHistogram::bounds(24), (400, 500));
    }

    #[test]
    fn test_histogram_single_sample() {
        let histogram = LatencyHistogram::new();
        histogram.record(3_000);
        let p50 = histogram.percentile(50);
        assert!((3_000..=4_000).contains(&p50));
        assert_eq!(histogram.average(), 3_000);
    }
}
