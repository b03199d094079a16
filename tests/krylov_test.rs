//! Krylov solvers on random diagonally dominant systems.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use openferric_fdm::math::bicgstab::BiCgStab;
use openferric_fdm::math::gmres::Gmres;

const N: usize = 50;

fn random_dominant_system(seed: u64) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut m: Vec<Vec<f64>> = vec![vec![0.0; N]; N];
    for (i, row) in m.iter_mut().enumerate() {
        let mut off_sum = 0.0;
        for (j, entry) in row.iter_mut().enumerate() {
            if i != j {
                *entry = rng.random_range(-1.0..1.0);
                off_sum += entry.abs();
            }
        }
        // strict diagonal dominance keeps both solvers well conditioned
        row[i] = off_sum + rng.random_range(1.0..2.0);
    }
    let x_true: Vec<f64> = (0..N).map(|_| rng.random_range(-5.0..5.0)).collect();
    let b: Vec<f64> = m
        .iter()
        .map(|row| row.iter().zip(&x_true).map(|(&a, &x)| a * x).sum())
        .collect();
    (m, x_true, b)
}

fn matvec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter()
        .map(|row| row.iter().zip(v).map(|(&a, &x)| a * x).sum())
        .collect()
}

#[test]
fn bicgstab_recovers_the_solution() {
    for seed in [7, 42, 1234] {
        let (m, x_true, b) = random_dominant_system(seed);
        let a = |v: &[f64]| matvec(&m, v);
        let result = BiCgStab::new(&a, 200, 1.0e-10, None)
            .solve(&b, &vec![0.0; N])
            .unwrap();
        assert!(result.iterations < 50, "iterations {}", result.iterations);
        assert!(result.error < 1.0e-10);
        for (xi, ti) in result.x.iter().zip(&x_true) {
            assert!((xi - ti).abs() < 1.0e-6);
        }
    }
}

#[test]
fn gmres_recovers_the_solution() {
    for seed in [7, 42, 1234] {
        let (m, x_true, b) = random_dominant_system(seed);
        let a = |v: &[f64]| matvec(&m, v);
        let result = Gmres::new(&a, N, 1.0e-10, None)
            .solve(&b, &vec![0.0; N])
            .unwrap();
        assert!(result.iterations < 50, "iterations {}", result.iterations);
        for (xi, ti) in result.x.iter().zip(&x_true) {
            assert!((xi - ti).abs() < 1.0e-6);
        }
    }
}

#[test]
fn jacobi_preconditioning_helps_both_solvers() {
    let (m, _, b) = random_dominant_system(99);
    let diag: Vec<f64> = (0..N).map(|i| m[i][i]).collect();
    let a = |v: &[f64]| matvec(&m, v);
    let precond = |v: &[f64]| -> Vec<f64> {
        v.iter().zip(&diag).map(|(&vi, &d)| vi / d).collect()
    };

    let plain = BiCgStab::new(&a, 200, 1.0e-10, None)
        .solve(&b, &vec![0.0; N])
        .unwrap();
    let pre = BiCgStab::new(&a, 200, 1.0e-10, Some(&precond))
        .solve(&b, &vec![0.0; N])
        .unwrap();
    assert!(pre.iterations <= plain.iterations);

    let plain = Gmres::new(&a, N, 1.0e-10, None)
        .solve(&b, &vec![0.0; N])
        .unwrap();
    let pre = Gmres::new(&a, N, 1.0e-10, Some(&precond))
        .solve(&b, &vec![0.0; N])
        .unwrap();
    assert!(pre.iterations <= plain.iterations);
}
