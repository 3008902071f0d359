//! # Grid-Bridge Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | gc-01 Grid Options | Flatten N slots into one document |
//! | gc-01 Grid Options | Serialize and walk a column tree |
//! | gc-02 Data Channel | Dispatch one fetch through the channel |
//! | gc-02 Data Channel | Listener registration check-and-set |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gc_01_grid_options::{register_component_references, CompositeConfiguration, InMemoryComponentRegistry};
use gc_02_data_channel::{ChannelConfig, DataFetchChannel, ListenerRegistry};
use gc_tests::fixtures::{column_tree, identity, standard_producers, wide_composite};
use grid_types::{DataRequest, ListenerId};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// GC-01: Options Flattening
// ============================================================================

fn bench_flattening(c: &mut Criterion) {
    let mut group = c.benchmark_group("gc-01-flattening");
    group.measurement_time(Duration::from_secs(5));

    for slots in [4, 16, 64] {
        let composite = wide_composite(slots, 8);
        group.throughput(Throughput::Elements((slots * 8) as u64));
        group.bench_with_input(BenchmarkId::new("serialize", slots), &composite, |b, composite| {
            b.iter(|| black_box(composite.serialize()))
        });
    }

    group.finish();
}

// ============================================================================
// GC-01: Column Trees
// ============================================================================

fn bench_column_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("gc-01-column-tree");

    for (depth, fanout) in [(1, 8), (2, 6), (3, 4)] {
        let mut composite = CompositeConfiguration::new();
        for column in column_tree(depth, fanout) {
            composite.add_column(column);
        }
        let label = format!("{depth}x{fanout}");

        group.bench_with_input(
            BenchmarkId::new("serialize_columns", &label),
            &composite,
            |b, composite| b.iter(|| black_box(composite.serialize_columns())),
        );
        group.bench_with_input(
            BenchmarkId::new("register_references", &label),
            &composite,
            |b, composite| {
                b.iter(|| {
                    let registry = InMemoryComponentRegistry::new();
                    black_box(register_component_references(composite.columns(), &registry))
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// GC-02: Data Channel
// ============================================================================

fn bench_channel(c: &mut Criterion) {
    let mut group = c.benchmark_group("gc-02-data-channel");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");

    let channel = DataFetchChannel::new(
        Arc::new(ListenerRegistry::new()),
        Arc::new(standard_producers()),
        ChannelConfig::default(),
    );
    let request = DataRequest::new(ListenerId::new("grid-1").expect("listener"))
        .with_producer(identity("rows"));

    group.bench_function("dispatch_responded", |b| {
        b.iter(|| runtime.block_on(channel.dispatch(black_box(request.clone()))))
    });

    let ids: Vec<ListenerId> = (0..1000)
        .map(|i| ListenerId::new(format!("grid-{i}")).expect("listener"))
        .collect();
    group.throughput(Throughput::Elements(ids.len() as u64));
    group.bench_function("register_if_absent_1000", |b| {
        b.iter(|| {
            let registry = ListenerRegistry::new();
            for id in &ids {
                black_box(registry.register_if_absent(id));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_flattening, bench_column_tree, bench_channel);
criterion_main!(benches);
