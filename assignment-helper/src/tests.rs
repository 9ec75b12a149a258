//! Random matrix tests comparing the solver against brute force

use rand::prelude::*;

use crate::error::Error;
use crate::solver::{solve, solve_batch, solve_with, Assignment, SolveOptions};
use crate::weights::WeightMatrix;

/// Random square matrix; each entry is zero with probability `zero_prob`
fn random_matrix(n: usize, zero_prob: f64, max: i64, rng: &mut impl Rng) -> Vec<Vec<i64>> {
    (0..n)
        .map(|_| {
            (0..n)
                .map(|_| {
                    if rng.gen_bool(zero_prob) {
                        0
                    } else {
                        rng.gen_range(1..=max)
                    }
                })
                .collect()
        })
        .collect()
}

/// Best weight over all permutations using only nonzero entries
fn brute_force(matrix: &[Vec<i64>]) -> Option<i64> {
    fn go(matrix: &[Vec<i64>], row: usize, used: &mut Vec<bool>, acc: i64, best: &mut Option<i64>) {
        if row == matrix.len() {
            if best.map_or(true, |b| acc > b) {
                *best = Some(acc);
            }
            return;
        }
        for col in 0..matrix.len() {
            if used[col] || matrix[row][col] == 0 {
                continue;
            }
            used[col] = true;
            go(matrix, row + 1, used, acc + matrix[row][col], best);
            used[col] = false;
        }
    }

    let mut best = None;
    go(matrix, 0, &mut vec![false; matrix.len()], 0, &mut best);
    best
}

/// Structural checks every returned assignment must pass
fn check_assignment(matrix: &[Vec<i64>], a: &Assignment<i64>) {
    let n = matrix.len();
    assert_eq!(a.pairs.len(), n);

    let mut cols_seen = vec![false; n];
    for (i, e) in a.pairs.iter().enumerate() {
        assert_eq!(e.row, i, "pairs must be ordered by row");
        assert!(!cols_seen[e.col], "column {} used twice", e.col);
        cols_seen[e.col] = true;
        assert!(matrix[e.row][e.col] > 0, "edge {:?} is not present", e);
    }

    let weight: i64 = a.pairs.iter().map(|e| matrix[e.row][e.col]).sum();
    assert_eq!(weight, a.total_weight);

    // Feasibility of the final labels on every present edge
    for i in 0..n {
        for j in 0..n {
            if matrix[i][j] > 0 {
                assert!(
                    a.labels.rows[i] + a.labels.cols[j] >= matrix[i][j],
                    "labels infeasible at ({}, {})",
                    i,
                    j
                );
            }
        }
    }

    // Duality certificate
    assert_eq!(a.dual_objective(), a.total_weight);
}

fn check_against_brute_force(matrix: Vec<Vec<i64>>, seed: u64) {
    let expected = brute_force(&matrix);
    let weights = WeightMatrix::from_rows(matrix.clone()).unwrap();

    for check_support in [true, false] {
        let options = SolveOptions::default().check_support(check_support);
        match (solve_with(weights.clone(), &options), expected) {
            (Ok(a), Some(best)) => {
                check_assignment(&matrix, &a);
                assert_eq!(
                    a.total_weight, best,
                    "suboptimal matching for {:?} (seed {})",
                    matrix, seed
                );
            }
            (Err(Error::NoPerfectMatchingPossible { size, .. }), None) => {
                assert_eq!(size, matrix.len());
            }
            (got, expected) => panic!(
                "mismatch for {:?} (seed {}, check_support {}): got {:?}, expected {:?}",
                matrix, seed, check_support, got, expected
            ),
        }
    }
}

#[test]
fn test_random_dense_small() {
    for seed in 0..40 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.gen_range(1..=6);
        let matrix = random_matrix(n, 0.0, 20, &mut rng);
        check_against_brute_force(matrix, seed);
    }
}

#[test]
fn test_random_sparse_small() {
    // Many zeros: some instances have no perfect matching at all
    for seed in 100..160 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.gen_range(2..=6);
        let matrix = random_matrix(n, 0.5, 9, &mut rng);
        check_against_brute_force(matrix, seed);
    }
}

#[test]
fn test_random_ties() {
    // Few distinct values produce many optima and many tight edges
    for seed in 200..240 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.gen_range(2..=6);
        let matrix = random_matrix(n, 0.1, 2, &mut rng);
        check_against_brute_force(matrix, seed);
    }
}

#[test]
fn test_random_large_certificate() {
    // Too large for brute force; rely on the duality certificate
    let mut rng = StdRng::seed_from_u64(4242);
    for n in [20, 35, 50] {
        let matrix = random_matrix(n, 0.0, 1000, &mut rng);
        let a = solve(WeightMatrix::from_rows(matrix.clone()).unwrap()).unwrap();
        check_assignment(&matrix, &a);
        assert!(a.stats.augmentations + a.stats.seeded == n);
    }
}

#[test]
fn test_random_float_weights() {
    for seed in 300..320 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.gen_range(1..=5);
        let matrix: Vec<Vec<f64>> = (0..n)
            .map(|_| (0..n).map(|_| rng.gen_range(0.1..10.0)).collect())
            .collect();
        let a = solve(WeightMatrix::from_rows(matrix.clone()).unwrap()).unwrap();

        let mut best = f64::MIN;
        let mut perm: Vec<usize> = (0..n).collect();
        permutations(&mut perm, 0, &mut |p| {
            let w: f64 = p.iter().enumerate().map(|(i, &j)| matrix[i][j]).sum();
            best = best.max(w);
        });

        assert_eq!(a.pairs.len(), n);
        assert!(
            (a.total_weight - best).abs() < 1e-6,
            "seed {}: got {}, best {}",
            seed,
            a.total_weight,
            best
        );
        assert!((a.dual_objective() - a.total_weight).abs() < 1e-6);
    }
}

fn permutations(perm: &mut Vec<usize>, k: usize, visit: &mut impl FnMut(&[usize])) {
    if k == perm.len() {
        visit(&perm[..]);
        return;
    }
    for i in k..perm.len() {
        perm.swap(k, i);
        permutations(perm, k + 1, visit);
        perm.swap(k, i);
    }
}

#[test]
fn test_batch_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(777);
    let batch: Vec<WeightMatrix<i64>> = (0..16)
        .map(|_| {
            let n = rng.gen_range(1..=8);
            WeightMatrix::from_rows(random_matrix(n, 0.3, 50, &mut rng)).unwrap()
        })
        .collect();

    let parallel = solve_batch(&batch);
    for (weights, result) in batch.iter().zip(parallel) {
        assert_eq!(result, solve(weights.clone()));
    }
}
