//! # Routing Benchmarks
//!
//! Benchmarks for the selection and admission hot paths: per-strategy
//! selection cost across fleet sizes, and the admit/release CAS pair.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use switchyard::{Destination, Request, Router, RoutingStrategy, Service, ServiceRegistry};

fn fleet_registry(size: usize) -> Arc<ServiceRegistry> {
    let service = Arc::new(Service::new("bench"));
    for i in 0..size {
        service.add(Arc::new(Destination::new(
            format!("10.0.{}.{}", i / 256, i % 256),
            64,
        )));
    }
    let registry = Arc::new(ServiceRegistry::new());
    registry.register("http", service);
    registry
}

fn benchmark_strategy_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_selection");

    for fleet_size in [3, 16, 64, 256] {
        group.throughput(Throughput::Elements(1));

        let strategies = [
            ("least_loaded", RoutingStrategy::least_loaded()),
            ("hash_routed", RoutingStrategy::hash_routed()),
            ("round_robin", RoutingStrategy::round_robin()),
        ];

        for (name, strategy) in strategies {
            let router = Router::new(fleet_registry(fleet_size), strategy);
            let request = Request::new("REQ12345", "http");

            group.bench_with_input(
                BenchmarkId::new(name, fleet_size),
                &fleet_size,
                |b, _| {
                    b.iter(|| {
                        let destination = router.route(black_box(&request)).unwrap();
                        black_box(destination);
                    })
                },
            );
        }
    }

    group.finish();
}

fn benchmark_admission_hot_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");
    group.throughput(Throughput::Elements(1));

    let destination = Destination::new("10.0.0.1", usize::MAX);
    group.bench_function("admit_release", |b| {
        b.iter(|| {
            assert!(black_box(&destination).try_admit());
            destination.release();
        })
    });

    let saturated = Destination::new("10.0.0.2", 1);
    assert!(saturated.try_admit());
    group.bench_function("admit_rejected", |b| {
        b.iter(|| {
            assert!(!black_box(&saturated).try_admit());
        })
    });

    group.finish();
}

fn benchmark_route_and_admit(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_and_admit");
    group.throughput(Throughput::Elements(1));

    let router = Router::new(fleet_registry(16), RoutingStrategy::least_loaded());
    let request = Request::new("REQ1", "http");

    group.bench_function("two_phase_flow", |b| {
        b.iter(|| {
            let destination = router.route(black_box(&request)).unwrap();
            if destination.try_admit() {
                destination.release();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_strategy_selection,
    benchmark_admission_hot_path,
    benchmark_route_and_admit
);
criterion_main!(benches);
