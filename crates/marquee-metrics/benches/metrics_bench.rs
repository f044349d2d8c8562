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

// Criterion benchmarks for marquee-metrics
//
// Run benchmarks with:
//   cargo bench -p marquee-metrics
//
// For detailed output with plots:
//   cargo bench -p marquee-metrics -- --save-baseline main

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marquee_metrics::{Counter, MetricsCollector, Operation, ServiceMetricsCollector};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn bench_record_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_call");
    let collector = ServiceMetricsCollector::new();

    group.bench_function("single_call", |b| {
        b.iter(|| {
            collector.record_call(
                black_box(Operation::RatingRequest),
                black_box(Instant::now()),
                black_box(true),
            )
        })
    });

    group.bench_function("every_operation", |b| {
        b.iter(|| {
            for op in Operation::ALL {
                collector.record_call(black_box(op), Instant::now(), true);
            }
        })
    });

    group.bench_function("counter", |b| {
        b.iter(|| collector.increment(black_box(Counter::FallbacksServed)))
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    let collector = ServiceMetricsCollector::new();
    for i in 0..1000u64 {
        let op = Operation::ALL[(i % 5) as usize];
        collector.record_call(op, Instant::now(), i % 3 != 0);
    }

    group.bench_function("populated", |b| b.iter(|| collector.snapshot()));
    group.finish();
}

fn bench_concurrent_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_recording");
    let collector = Arc::new(ServiceMetricsCollector::new());

    group.bench_function("four_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let collector = Arc::clone(&collector);
                    thread::spawn(move || {
                        for _ in 0..100 {
                            collector.record_call(Operation::CatalogCall, Instant::now(), true);
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_record_call, bench_snapshot, bench_concurrent_recording);
criterion_main!(benches);
