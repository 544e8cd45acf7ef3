//! Benchmarks for circuit replay at different system sizes.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qtraj::easybuild::{control_staircase, monitored_brickwork};
use qtraj::{execute, expand, RecordingPolicy, RngRegistry, StreamName, Topology, TraceState};

fn registry(seed: u64) -> RngRegistry {
    RngRegistry::new(StreamName::ALL.iter().map(|&name| (name, seed)))
}

fn bench_monitored_brickwork(c: &mut Criterion) {
    let mut group = c.benchmark_group("monitored_brickwork");
    for n in [8, 32, 128] {
        let circuit = monitored_brickwork(n, 2 * n, 0.1, Topology::Periodic).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &circuit, |b, circuit| {
            b.iter(|| {
                let mut state = TraceState::new();
                let mut rngs = registry(1);
                execute(
                    black_box(circuit),
                    &mut state,
                    &mut rngs,
                    4,
                    &RecordingPolicy::EveryTrial,
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_control_staircase_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("control_staircase_expand");
    for n in [8, 32, 128] {
        let circuit = control_staircase(n, 2 * n, 0.3, 0.1).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &circuit, |b, circuit| {
            b.iter(|| {
                let mut rngs = registry(1);
                expand(black_box(circuit), &mut rngs, 4, &RecordingPolicy::EveryOperation)
                    .unwrap()
                    .ops
                    .len()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_monitored_brickwork, bench_control_staircase_expand);
criterion_main!(benches);
