//! Fixtures for end-to-end runs. Every generator is seeded.

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64;
use spectra_core::PointSet;
use std::f64::consts::PI;

/// Two tight squares of 4 points each, 5 units apart. Rows 0..4 and 4..8.
pub fn two_squares() -> PointSet {
    PointSet::from_rows(&[
        vec![0.0, 0.0],
        vec![0.05, 0.0],
        vec![0.0, 0.05],
        vec![0.05, 0.05],
        vec![5.0, 5.0],
        vec![5.05, 5.0],
        vec![5.0, 5.05],
        vec![5.05, 5.05],
    ])
    .unwrap()
}

/// `n_per` points around each center with isotropic Gaussian spread `std`.
/// Rows are grouped by center, in center order.
pub fn make_blobs(centers: &[Vec<f64>], n_per: usize, std: f64, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(centers.len() * n_per);
    for ctr in centers {
        for _ in 0..n_per {
            rows.push(
                ctr.iter()
                    .map(|&c| Normal::new(c, std).unwrap().sample(&mut rng))
                    .collect(),
            );
        }
    }
    rows
}

/// [`make_blobs`] wrapped into a point set.
pub fn blob_points(centers: &[Vec<f64>], n_per: usize, std: f64, seed: u64) -> PointSet {
    PointSet::from_rows(&make_blobs(centers, n_per, std, seed)).unwrap()
}

/// Outer unit circle on rows `0..n/2`, inner circle of radius `factor` after.
pub fn circles(n: usize, factor: f64, noise: f64, seed: u64) -> PointSet {
    let mut rng = Pcg64::seed_from_u64(seed);
    let jitter = Normal::new(0.0, noise).unwrap();
    let n_outer = n / 2;
    let n_inner = n - n_outer;
    let mut rows = Vec::with_capacity(n);
    for (count, radius) in [(n_outer, 1.0), (n_inner, factor)] {
        for i in 0..count {
            let t = 2.0 * PI * i as f64 / count as f64;
            rows.push(vec![
                radius * t.cos() + jitter.sample(&mut rng),
                radius * t.sin() + jitter.sample(&mut rng),
            ]);
        }
    }
    PointSet::from_rows(&rows).unwrap()
}

/// Ground-truth labelling for fixtures whose rows are grouped in equal runs.
pub fn grouped_labels(n_groups: usize, n_per: usize) -> Vec<usize> {
    (0..n_groups * n_per).map(|i| i / n_per).collect()
}
