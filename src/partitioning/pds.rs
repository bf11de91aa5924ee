//! Perfect difference set (PDS) search.
//!
//! A planar difference set of order `p` is a set of `p + 1` residues modulo
//! `m = p² + p + 1` whose pairwise differences cover every nonzero residue
//! exactly once. Translating it by each residue yields `m` neighborhoods that
//! pairwise intersect in exactly one element.
//!
//! Sets are found by brute force over order-3 linear recurrences
//! `s[n] = a·s[n-1] + b·s[n-2] + c·s[n-3] (mod p)` seeded with `(0, 0, 1)`:
//! the zero positions of a recurrence that returns to a multiple of its seed
//! after exactly `m` steps form a Singer difference set.

/// Returns `p` if `num_procs == p² + p + 1` for a prime `p`.
pub fn pds_order(num_procs: usize) -> Option<usize> {
    let mut p = 1usize;
    while p * p + p + 1 <= num_procs {
        if p * p + p + 1 == num_procs && is_prime(p) {
            return Some(p);
        }
        p += 1;
    }
    None
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Searches for a perfect difference set of order `p`.
///
/// Returns the sorted residues, or `None` if no recurrence in the search space
/// qualifies.
pub fn find_pds(p: usize) -> Option<Vec<usize>> {
    if p < 2 {
        return None;
    }
    let m = p * p + p + 1;
    for a in 0..p {
        for b in 0..p {
            for c in 0..p {
                if let Some(zeros) = recurrence_zeros(a, b, c, p) {
                    if is_perfect_difference_set(&zeros, m) {
                        return Some(zeros);
                    }
                }
            }
        }
    }
    None
}

/// Zero positions of one candidate recurrence, or `None` if it is rejected.
///
/// Accepted only when the window `[0, m)` has exactly `p + 1` zeros and the two
/// terms right after the window are both zero.
fn recurrence_zeros(a: usize, b: usize, c: usize, p: usize) -> Option<Vec<usize>> {
    let m = p * p + p + 1;
    let mut seq = vec![0usize; m + 2];
    seq[2] = 1;
    for i in 3..m + 2 {
        seq[i] = (a * seq[i - 1] + b * seq[i - 2] + c * seq[i - 3]) % p;
    }
    if seq[m] != 0 || seq[m + 1] != 0 {
        return None;
    }
    let zeros: Vec<usize> = (0..m).filter(|&i| seq[i] == 0).collect();
    (zeros.len() == p + 1).then_some(zeros)
}

/// Checks that every nonzero residue mod `m` is a difference of two members
/// of `set` exactly once.
pub fn is_perfect_difference_set(set: &[usize], m: usize) -> bool {
    if m == 0 {
        return false;
    }
    let mut seen = vec![0u32; m];
    for &x in set {
        for &y in set {
            if x != y {
                seen[(x + m - y % m) % m] += 1;
            }
        }
    }
    seen[0] == 0 && seen[1..].iter().all(|&n| n == 1)
}
