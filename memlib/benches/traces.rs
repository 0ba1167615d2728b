use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use memlib::config::{Associativity, CacheLevelConfig, SimConfig, TlbConfig};
use memlib::simulator::Simulator;
use memlib::trace::{AccessMode, TraceEvent};

/// A deterministic mix of strided reads and writes across a few hundred
/// pages, so runs are comparable without shipping trace files
fn synthetic_trace(len: usize) -> Vec<TraceEvent> {
    (0..len)
        .map(|i| {
            let vaddr = ((i * 52) % (1 << 20)) as u32;
            let mode = if i % 5 == 0 {
                AccessMode::Write
            } else {
                AccessMode::Read
            };
            TraceEvent { mode, vaddr }
        })
        .collect()
}

fn config(levels: &[(u32, u32, Associativity)]) -> SimConfig {
    SimConfig {
        caches: levels
            .iter()
            .enumerate()
            .map(|(i, &(size, block_size, associativity))| CacheLevelConfig {
                name: format!("L{}", i + 1),
                size,
                block_size,
                associativity,
            })
            .collect(),
        tlb: TlbConfig {
            entries: 16,
            associativity: Associativity::TwoWay,
        },
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Synthetic traces");
    let trace = synthetic_trace(100_000);

    let cases = [
        ("single direct", config(&[(1024, 16, Associativity::Direct)])),
        ("single full", config(&[(1024, 16, Associativity::Full)])),
        (
            "two level 4way",
            config(&[
                (1024, 16, Associativity::FourWay),
                (16384, 16, Associativity::FourWay),
            ]),
        ),
    ];

    for (name, config) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |bench, conf| {
            bench.iter(|| {
                let mut simulator = Simulator::new(conf).unwrap();
                simulator.simulate(trace.iter().copied())
            });
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
