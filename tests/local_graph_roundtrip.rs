use graph_ingress::graph_error::GraphError;
use graph_ingress::local_graph::{BuilderConfig, PartitionedGraphBuilder};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Arc;

fn five_edges() -> PartitionedGraphBuilder<u64, (u64, u64)> {
    let b = PartitionedGraphBuilder::default();
    for (s, t) in [(0u64, 3u64), (0, 6), (2, 3), (3, 4), (0, 1)] {
        b.add_edge(s, t, (s, t)).unwrap();
    }
    b
}

#[test]
fn small_graph_round_trip() {
    let mut b = five_edges();
    b.finalize().unwrap();
    assert_eq!(b.num_out_edges(&0).unwrap(), 3);
    assert_eq!(b.num_in_edges(&3).unwrap(), 2);
    assert_eq!(b.num_out_edges(&6).unwrap(), 0);

    let first: BTreeSet<u64> = b.out_neighbors(&0).unwrap().copied().collect();
    let second: BTreeSet<u64> = b.out_neighbors(&0).unwrap().copied().collect();
    assert_eq!(first, BTreeSet::from([1, 3, 6]));
    assert_eq!(first, second);

    let ins: BTreeSet<u64> = b.in_neighbors(&3).unwrap().copied().collect();
    assert_eq!(ins, BTreeSet::from([0, 2]));

    for e in b.in_edges(&3).unwrap() {
        let via_in = *b.edge_payload(e.handle).unwrap();
        assert_eq!(via_in, (*e.source, *e.target));
        let out = b
            .out_edges(e.source)
            .unwrap()
            .find(|o| o.target == e.target)
            .unwrap();
        assert_eq!(*b.edge_payload(out.handle).unwrap(), via_in);
    }
}

#[test]
fn unknown_vertex_has_no_edges() {
    let mut b = five_edges();
    b.finalize().unwrap();
    assert_eq!(b.num_in_edges(&77).unwrap(), 0);
    assert_eq!(b.out_edges(&77).unwrap().len(), 0);
    assert_eq!(b.in_neighbors(&77).unwrap().count(), 0);
}

#[test]
fn finalize_is_idempotent() {
    let mut b = five_edges();
    b.finalize().unwrap();
    let csr = b.csr().unwrap().clone();
    let csc = b.csc().unwrap().clone();
    b.finalize().unwrap();
    assert_eq!(b.csr().unwrap(), &csr);
    assert_eq!(b.csc().unwrap(), &csc);
}

#[test]
fn clear_behaves_like_fresh_builder() {
    let mut b = five_edges();
    b.finalize().unwrap();
    b.clear();
    assert!(!b.is_finalized());
    assert_eq!(b.num_edges(), 0);
    assert_eq!(b.csr(), Err(GraphError::NotFinalized));
    b.add_edge(9, 8, (9, 8)).unwrap();
    b.finalize().unwrap();
    assert_eq!(b.vertices().unwrap(), &[9, 8]);
    assert_eq!(b.num_out_edges(&9).unwrap(), 1);
}

#[test]
fn empty_builder_finalizes() {
    let mut b = PartitionedGraphBuilder::<u32, ()>::default();
    b.finalize().unwrap();
    assert_eq!(b.num_vertices(), 0);
    assert_eq!(b.csr().unwrap().num_rows(), 0);
    assert!(b.csc_to_csr().unwrap().is_empty());
}

#[test]
fn concurrent_writers() {
    let b = PartitionedGraphBuilder::<u32, u32>::default();
    std::thread::scope(|scope| {
        for w in 0..4u32 {
            let b = &b;
            scope.spawn(move || {
                for i in 0..250u32 {
                    b.add_edge(w, 100 + i % 50, w * 1000 + i).unwrap();
                }
            });
        }
    });
    let mut b = b;
    b.finalize().unwrap();
    assert_eq!(b.num_edges(), 1000);
    assert_eq!(b.num_vertices(), 54);
    for w in 0..4 {
        assert_eq!(b.num_out_edges(&w).unwrap(), 250);
    }
    assert_eq!(b.num_in_edges(&100).unwrap(), 20);
}

#[test]
fn shared_pool_finalize() {
    let pool = Arc::new(rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap());
    let mut b = PartitionedGraphBuilder::<u32, ()>::new(BuilderConfig::default()).with_pool(pool);
    b.add_edges(vec![1, 2, 3], vec![2, 3, 1], vec![(), (), ()]).unwrap();
    b.finalize().unwrap();
    assert_eq!(b.num_in_edges(&1).unwrap(), 1);
}

proptest! {
    #[test]
    fn csr_and_csc_describe_the_same_edges(seed in any::<u64>(), n_edges in 0usize..300) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let edges: Vec<(u32, u32)> = (0..n_edges)
            .map(|_| (rng.gen_range(0..40), rng.gen_range(0..40)))
            .collect();
        let mut b = PartitionedGraphBuilder::<u32, usize>::default();
        for (k, &(s, t)) in edges.iter().enumerate() {
            b.add_edge(s, t, k).unwrap();
        }
        b.finalize().unwrap();

        let csr = b.csr().unwrap();
        let csc = b.csc().unwrap();
        prop_assert_eq!(csr.num_entries(), n_edges);
        prop_assert_eq!(csc.num_entries(), n_edges);

        // every edge is reachable from both views with the same payload
        let mut seen = vec![0u8; n_edges];
        for v in b.vertices().unwrap() {
            for e in b.out_edges(v).unwrap() {
                let k = *b.edge_payload(e.handle).unwrap();
                prop_assert_eq!(edges[k], (*e.source, *e.target));
                seen[k] += 1;
            }
            let mut prev = None;
            for e in b.in_edges(v).unwrap() {
                let k = *b.edge_payload(e.handle).unwrap();
                prop_assert_eq!(edges[k], (*e.source, *e.target));
                seen[k] += 1;
                // CSC rows are sorted by local source index
                let src = b.local_index(e.source).unwrap();
                prop_assert!(prev <= src);
                prev = src;
            }
        }
        prop_assert!(seen.iter().all(|&c| c == 2));

        // the translation is a permutation
        let mut t: Vec<u32> = b.csc_to_csr().unwrap().to_vec();
        t.sort_unstable();
        prop_assert!(t.iter().enumerate().all(|(i, &x)| i as u32 == x));
    }
}
