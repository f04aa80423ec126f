use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use ecosim::core::config::SimulationConfig;
use ecosim::factory::{EntitySpec, Factories};
use ecosim::simulation::simulator::Simulator;
use ecosim::spatial::region_manager::WorldDims;

const STEPS: usize = 32;

fn populated(sheep: usize, wolves: usize) -> Simulator {
    let mut config = SimulationConfig::default();
    config.seed = 0xBEEF;
    let mut sim = Simulator::new(WorldDims::new(800, 600, 20, 15), config, Factories::standard())
        .expect("valid world");
    for _ in 0..sheep {
        sim.spawn_animal(&EntitySpec::new("sheep")).expect("sheep spec");
    }
    for _ in 0..wolves {
        sim.spawn_animal(&EntitySpec::new("wolf")).expect("wolf spec");
    }
    sim
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    group.sample_size(30);

    for &sheep in &[100_usize, 500, 2000] {
        let wolves = sheep / 10;
        group.bench_with_input(
            BenchmarkId::new(format!("steps{STEPS}"), sheep + wolves),
            &(sheep, wolves),
            |b, &(sheep, wolves)| {
                b.iter_batched(
                    || populated(sheep, wolves),
                    |mut sim| {
                        for _ in 0..STEPS {
                            sim.advance(0.03);
                        }
                        sim
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let sim = populated(2000, 0);
    c.bench_function("snapshot_2000", |b| b.iter(|| sim.snapshot().animal_count()));
}

criterion_group!(benches, bench_advance, bench_snapshot);
criterion_main!(benches);
