//! Ingress → aggregation → per-partition local graphs, with the shuffle
//! simulated in memory.

use graph_ingress::prelude::*;
use graph_ingress::partitioning::{load_imbalance, replication_factor};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn run(algorithm: IngressAlgorithm, num_procs: usize) {
    let mut rng = SmallRng::seed_from_u64(77);
    let edges: Vec<(u64, u64)> = (0..5_000)
        .map(|_| (rng.gen_range(0..600), rng.gen_range(0..600)))
        .collect();

    let cfg = IngressConfig { num_procs, algorithm, rng_seed: 5 };
    let mut ingress = build_ingress::<u64>(&cfg).unwrap();
    let builders: Vec<PartitionedGraphBuilder<u64, u32>> =
        (0..num_procs).map(|_| PartitionedGraphBuilder::default()).collect();
    let mut fragments: Vec<VertexFragment<u64, String>> = Vec::new();
    let mut loads = vec![0u64; num_procs];

    for (k, &(s, t)) in edges.iter().enumerate() {
        let a = assign_edge(&mut ingress, s, t, k as u32).unwrap();
        loads[a.pid] += 1;
        builders[a.pid].add_edge(a.source, a.target, a.payload).unwrap();
        fragments.push(a.source_touch.into());
        fragments.push(a.target_touch.into());
    }
    for v in 0..600u64 {
        fragments.push(VertexFragment::Payload { vertex: v, payload: format!("v{v}") });
    }

    let agg_cfg = AggregatorConfig { num_procs, rng_seed: 5 };
    let records = aggregate_parallel(fragments, &agg_cfg, RejectMultiple).unwrap();
    assert_eq!(records.len(), 600);
    assert!(replication_factor(&records) >= 1.0);
    assert!(load_imbalance(&loads) < 5_000);

    let mut builders = builders;
    for b in &mut builders {
        b.finalize().unwrap();
    }

    // each record's hosts are exactly the partitions whose local graph has the vertex
    for r in &records {
        for (p, b) in builders.iter().enumerate() {
            let local = b.local_index(&r.vertex).unwrap().is_some();
            let host = r.owner == p || r.is_mirrored_on(p);
            if r.in_edges + r.out_edges > 0 {
                assert_eq!(local, host, "vertex {} partition {p}", r.vertex);
            } else {
                assert!(!local);
            }
        }
        let out: usize = builders.iter().map(|b| b.num_out_edges(&r.vertex).unwrap()).sum();
        let inn: usize = builders.iter().map(|b| b.num_in_edges(&r.vertex).unwrap()).sum();
        assert_eq!(out as u64, r.out_edges);
        assert_eq!(inn as u64, r.in_edges);
        assert_eq!(r.payload.as_deref(), Some(format!("v{}", r.vertex).as_str()));
    }
}

#[test]
fn random_pipeline() {
    run(IngressAlgorithm::Random, 6);
}

#[test]
fn greedy_pipeline() {
    run(IngressAlgorithm::Greedy, 6);
}

#[test]
fn constrained_pipelines() {
    run(IngressAlgorithm::ConstrainedRandom, 9);
    run(IngressAlgorithm::ConstrainedGreedy, 9);
    run(IngressAlgorithm::ConstrainedPdsRandom, 13);
}
