use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use graph_ingress::local_graph::{BuilderConfig, PartitionedGraphBuilder};

fn filled(n_edges: usize, vertices: u64, num_threads: usize) -> PartitionedGraphBuilder<u64, u32> {
    let mut rng = SmallRng::seed_from_u64(7);
    let builder = PartitionedGraphBuilder::new(BuilderConfig { num_threads });
    for k in 0..n_edges {
        builder
            .add_edge(rng.gen_range(0..vertices), rng.gen_range(0..vertices), k as u32)
            .unwrap();
    }
    builder
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("finalize");
    group.sample_size(20);

    for &(n_edges, vertices) in &[(100_000usize, 10_000u64), (1_000_000, 100_000)] {
        for &threads in &[1usize, 0] {
            group.bench_with_input(
                BenchmarkId::new(format!("e{n_edges}_v{vertices}"), threads),
                &threads,
                |b, &threads| {
                    b.iter_batched(
                        || filled(n_edges, vertices, threads),
                        |mut builder| {
                            builder.finalize().unwrap();
                            builder
                        },
                        BatchSize::LargeInput,
                    );
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_finalize);
criterion_main!(benches);
