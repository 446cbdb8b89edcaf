//! Benchmarks for the derived-metric calculators

#![allow(missing_docs, clippy::indexing_slicing)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pulseboard_core::config::MetricsConfig;
use pulseboard_core::types::{
    Alert, AlertSeverity, AlertStatus, GeoPoint, Store, Truck, TruckStatus,
};
use pulseboard_dashboard::actions::derive_actions;
use pulseboard_dashboard::metrics::SupplyChainSummary;
use std::hint::black_box;

const STATUSES: [TruckStatus; 5] = [
    TruckStatus::InTransit,
    TruckStatus::Delayed,
    TruckStatus::Idle,
    TruckStatus::Maintenance,
    TruckStatus::Delivered,
];

#[allow(clippy::cast_precision_loss)]
fn fleet(n: usize) -> (Vec<Truck>, Vec<Store>, Vec<Alert>) {
    let trucks = (0..n)
        .map(|i| Truck {
            id: format!("TRK-{i}"),
            name: format!("Rig {i}"),
            position: GeoPoint::new(41.0 + (i % 100) as f64 * 0.01, -87.0),
            status: STATUSES[i % STATUSES.len()],
            cargo_load: (i % 24) as f64,
            cargo_capacity: 24.0,
            fuel_level: (i % 100) as f64,
            destination: None,
            eta: None,
        })
        .collect();

    let stores = (0..n / 4)
        .map(|i| Store {
            id: format!("STR-{i}"),
            name: format!("Store {i}"),
            position: GeoPoint::new(41.5, -87.5),
            stock_level: (i % 100) as f64,
            capacity: 1_000,
            demand_rate: 25.0,
            skus: Vec::new(),
        })
        .collect();

    let alerts = (0..n / 2)
        .map(|i| Alert {
            id: format!("ALT-{i}"),
            severity: if i % 7 == 0 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Medium
            },
            position: GeoPoint::new(41.5, -87.5),
            message: "Sensor".to_string(),
            suggested_actions: Vec::new(),
            status: if i % 3 == 0 {
                AlertStatus::Resolved
            } else {
                AlertStatus::Open
            },
            created_at: None,
        })
        .collect();

    (trucks, stores, alerts)
}

/// Benchmark the header summary over growing fleets
fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("supply_chain_summary");
    let config = MetricsConfig::default();

    for size in [10_usize, 100, 1_000, 10_000] {
        let (trucks, stores, alerts) = fleet(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                SupplyChainSummary::compute(
                    black_box(&trucks),
                    black_box(&stores),
                    black_box(&alerts),
                    &config,
                )
            });
        });
    }

    group.finish();
}

/// Benchmark client-side recommendation derivation
fn bench_derive_actions(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_actions");
    let config = MetricsConfig::default();

    for size in [100_usize, 1_000, 10_000] {
        let (trucks, stores, alerts) = fleet(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| derive_actions(black_box(&trucks), black_box(&stores), black_box(&alerts), &config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_summary, bench_derive_actions);
criterion_main!(benches);
