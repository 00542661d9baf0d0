//! Concurrent operations benchmarks.
//!
//! Measures inserts from several threads under each displacement mode, and
//! lookups running alongside writers.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use cuckoocraft::prelude::*;
use std::sync::Arc;
use std::thread;

fn bench_concurrent_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_inserts");

    let capacity = 1_000_000u64;
    let ops_per_thread = 50_000u64;
    let thread_counts = [1u64, 2, 4, 8];

    for safety in [SwapSafety::Fast, SwapSafety::Reliable, SwapSafety::Smart] {
        for &threads in &thread_counts {
            group.throughput(Throughput::Elements(ops_per_thread * threads));
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", safety), threads),
                &threads,
                |b, &threads| {
                    b.iter_batched(
                        || {
                            Arc::new(
                                CuckooFilterBuilder::new(capacity)
                                    .with_swap_safety(safety)
                                    .with_concurrency(64)
                                    .build()
                                    .unwrap(),
                            )
                        },
                        |filter| {
                            let handles: Vec<_> = (0..threads)
                                .map(|t| {
                                    let filter = Arc::clone(&filter);
                                    thread::spawn(move || {
                                        let start = t * ops_per_thread;
                                        for i in start..start + ops_per_thread {
                                            filter.insert(black_box(&i.to_le_bytes()));
                                        }
                                    })
                                })
                                .collect();

                            for handle in handles {
                                handle.join().unwrap();
                            }

                            black_box(filter)
                        },
                        BatchSize::LargeInput,
                    );
                },
            );
        }
    }

    group.finish();
}

/// Readers query preloaded keys while one writer keeps inserting.
fn bench_contains_under_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains_under_writes");
    let ops_per_reader = 100_000u64;

    for readers in [1u64, 4] {
        group.throughput(Throughput::Elements(ops_per_reader * readers));
        group.bench_with_input(BenchmarkId::from_parameter(readers), &readers, |b, &readers| {
            let filter = Arc::new(CuckooFilter::new(1_000_000).unwrap());
            for i in 0..100_000u64 {
                filter.insert(&i.to_le_bytes());
            }
            let mut next = 1_000_000u64;

            b.iter(|| {
                let writer = {
                    let filter = Arc::clone(&filter);
                    let start = next;
                    thread::spawn(move || {
                        for i in start..start + 10_000 {
                            filter.insert(&i.to_le_bytes());
                        }
                    })
                };
                next += 10_000;

                let handles: Vec<_> = (0..readers)
                    .map(|_| {
                        let filter = Arc::clone(&filter);
                        thread::spawn(move || {
                            let mut hits = 0u64;
                            for i in 0..ops_per_reader {
                                if filter.contains(black_box(&(i % 100_000).to_le_bytes())) {
                                    hits += 1;
                                }
                            }
                            hits
                        })
                    })
                    .collect();

                let hits: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
                writer.join().unwrap();
                black_box(hits)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_concurrent_inserts, bench_contains_under_writes);
criterion_main!(benches);
