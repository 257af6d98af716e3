// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Device pool and dispatch throughput benchmarks.
//!
//! Measures lease/release cost, contended acquisition, and full job
//! dispatch through the gateway on zero-latency simulated workers.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use imagegate::engine::{ImagePipeline, SimulatedPipeline, SizePlanner};
use imagegate::scheduler::Job;
use imagegate::workers::{ResourcePool, WorkerHandle, WorkerRegistry};
use imagegate::{Gateway, GatewayConfig};

fn handles(n: u32) -> Vec<WorkerHandle> {
    (0..n).map(WorkerHandle::new).collect()
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

fn bench_try_acquire_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_lease");
    group.throughput(Throughput::Elements(1));

    for devices in [1u32, 4, 8] {
        let pool = ResourcePool::new(handles(devices));
        group.bench_function(BenchmarkId::new("try_acquire_drop", devices), |b| {
            b.iter(|| {
                let lease = pool.try_acquire();
                black_box(lease.as_ref().map(|l| l.handle()));
            })
        });
    }

    group.finish();
}

fn bench_contended_acquire(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("pool_contended");

    for (devices, tasks) in [(1u32, 16usize), (4, 16), (4, 64)] {
        group.throughput(Throughput::Elements(tasks as u64));
        let pool = ResourcePool::new(handles(devices));
        group.bench_function(BenchmarkId::new(format!("{devices}_devices"), tasks), |b| {
            b.iter(|| {
                rt.block_on(async {
                    let joins: Vec<_> = (0..tasks)
                        .map(|_| {
                            let pool = pool.clone();
                            tokio::spawn(async move {
                                let lease = pool.acquire().await.unwrap();
                                tokio::task::yield_now().await;
                                black_box(lease.handle())
                            })
                        })
                        .collect();
                    futures::future::join_all(joins).await
                })
            })
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("dispatch");
    group.sample_size(20);

    for devices in [1u32, 4] {
        let gateway = Gateway::without_delivery(GatewayConfig::default());
        let registry = WorkerRegistry::load(&handles(devices), |device| {
            Ok(Arc::new(SimulatedPipeline::new(device, Duration::ZERO)) as Arc<dyn ImagePipeline>)
        })
        .unwrap();
        gateway.install_workers(registry).unwrap();

        let jobs = 32usize;
        group.throughput(Throughput::Elements(jobs as u64));
        group.bench_function(BenchmarkId::new("submit_batch", devices), |b| {
            b.iter(|| {
                rt.block_on(async {
                    let submissions = (0..jobs).map(|i| {
                        gateway
                            .dispatcher
                            .submit(Job::new("benchmark").with_seed(i as u64))
                    });
                    futures::future::join_all(submissions).await
                })
            })
        });
    }

    group.finish();
}

fn bench_size_planning(c: &mut Criterion) {
    let planner = SizePlanner::default();
    c.bench_function("size_plan", |b| {
        b.iter(|| planner.plan(black_box("16:9"), black_box(1.5)))
    });
}

criterion_group!(
    benches,
    bench_try_acquire_release,
    bench_contended_acquire,
    bench_dispatch,
    bench_size_planning
);
criterion_main!(benches);
