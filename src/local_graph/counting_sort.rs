//! Parallel counting sort of edge triples.
//!
//! Edges are bucketed by a primary key (local source or target index) with a
//! stable counting sort, then each bucket is sorted by a secondary key. The
//! bucket sorts are independent and run as one rayon task per non-empty bucket;
//! `for_each` returns only after every bucket is sorted.

use bitvec::prelude::*;
use rayon::prelude::*;

/// Output of [`bucket_sort`]: bucket boundaries and a permutation from final
/// position to original position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketSort {
    /// `offsets[k]..offsets[k + 1]` is bucket `k`; length `num_buckets + 1`.
    pub offsets: Vec<u32>,
    /// `permutation[final] = original`.
    pub permutation: Vec<u32>,
}

/// Sorts positions of `primary` by `(primary, secondary)`, stable on ties.
///
/// Every key in `primary` must be below `num_buckets`, and `secondary` must be
/// as long as `primary`.
pub fn bucket_sort(primary: &[u32], secondary: &[u32], num_buckets: usize) -> BucketSort {
    debug_assert_eq!(primary.len(), secondary.len());
    let mut counts = vec![0u32; num_buckets + 1];
    for &k in primary {
        counts[k as usize + 1] += 1;
    }
    for i in 0..num_buckets {
        counts[i + 1] += counts[i];
    }
    let offsets = counts;

    let mut cursor = offsets.clone();
    let mut permutation = vec![0u32; primary.len()];
    for (i, &k) in primary.iter().enumerate() {
        let slot = &mut cursor[k as usize];
        permutation[*slot as usize] = i as u32;
        *slot += 1;
    }

    split_buckets(&mut permutation, &offsets)
        .into_par_iter()
        .filter(|bucket| bucket.len() > 1)
        .for_each(|bucket| bucket.sort_by_key(|&orig| secondary[orig as usize]));

    BucketSort {
        offsets,
        permutation,
    }
}

/// Disjoint mutable views of each bucket.
fn split_buckets<'a>(mut rest: &'a mut [u32], offsets: &[u32]) -> Vec<&'a mut [u32]> {
    let mut buckets = Vec::with_capacity(offsets.len().saturating_sub(1));
    for w in offsets.windows(2) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut((w[1] - w[0]) as usize);
        buckets.push(head);
        rest = tail;
    }
    buckets
}

/// Reorders `data` in place so that `data[k]` becomes the old `data[perm[k]]`.
///
/// `perm` must be a permutation of `0..data.len()`.
pub fn permute_in_place<T>(data: &mut [T], perm: &[u32]) {
    debug_assert_eq!(data.len(), perm.len());
    let mut done = bitvec![0; data.len()];
    for start in 0..data.len() {
        if done[start] {
            continue;
        }
        let mut j = start;
        loop {
            done.set(j, true);
            let next = perm[j] as usize;
            if next == start {
                break;
            }
            data.swap(j, next);
            j = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_primary_then_secondary() {
        let src = [2u32, 0, 2, 1, 0, 2];
        let dst = [5u32, 9, 1, 4, 3, 1];
        let s = bucket_sort(&src, &dst, 4);
        assert_eq!(s.offsets, vec![0, 2, 3, 6, 6]);
        let pairs: Vec<_> = s
            .permutation
            .iter()
            .map(|&i| (src[i as usize], dst[i as usize]))
            .collect();
        assert_eq!(pairs, vec![(0, 3), (0, 9), (1, 4), (2, 1), (2, 1), (2, 5)]);
        // duplicate (2, 1) pairs keep input order: positions 2 then 5
        assert_eq!(&s.permutation[3..5], &[2, 5]);
    }

    #[test]
    fn empty_input() {
        let s = bucket_sort(&[], &[], 3);
        assert_eq!(s.offsets, vec![0, 0, 0, 0]);
        assert!(s.permutation.is_empty());
    }

    #[test]
    fn permute_matches_gather() {
        let perm = [3u32, 0, 4, 1, 2, 5];
        let mut data: Vec<String> = ["a", "b", "c", "d", "e", "f"].iter().map(|s| s.to_string()).collect();
        let expected: Vec<String> = perm.iter().map(|&p| data[p as usize].clone()).collect();
        permute_in_place(&mut data, &perm);
        assert_eq!(data, expected);
    }
}
