//! Test suite for Stage B: degree vector and graph Laplacian.
//!
//! Test organization:
//! - Structural invariants: symmetry, row sums, unit diagonal, degree vector
//! - Spectral bounds: λ ∈ [0, 2] via Monte Carlo Rayleigh quotient sampling
//! - Nullspace: L_sym · D^{1/2}1 = 0
//! - Isolated nodes: zero-factor policy, no NaN/Inf
//! - Normalization modes and argument validation

use approx::{abs_diff_eq, relative_eq};
use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng};

use crate::affinity::{build, AffinityMatrix};
use crate::data::PointSet;
use crate::laplacian::{degree, laplacian, normalize, LaplacianConfig, LaplacianStage};
use crate::tests::init;

use super::test_data::{make_blobs, uniform_points};

fn blob_affinity(seed: u64) -> AffinityMatrix {
    let rows = make_blobs(&[vec![0.0, 0.0], vec![3.0, 0.0]], 10, 0.5, seed);
    build(&PointSet::from_rows(&rows).unwrap(), 1.0).unwrap()
}

#[test]
fn test_degree_is_row_sum() {
    let a = blob_affinity(11);
    let deg = degree(&a);
    assert_eq!(deg.len(), a.n_nodes());

    for i in 0..a.n_nodes() {
        let row_sum: f64 = (0..a.n_nodes()).map(|j| a.get(i, j)).sum();
        let col_sum: f64 = (0..a.n_nodes()).map(|j| a.get(j, i)).sum();
        assert!(relative_eq!(deg.get(i), row_sum, epsilon = 1e-12));
        assert!(relative_eq!(deg.get(i), col_sum, epsilon = 1e-12));
        assert!(deg.get(i) >= 0.0);
    }
    assert!(deg.isolated().is_empty());
}

#[test]
fn test_unnormalized_row_sums_zero() {
    init();
    // THEORY: in L = D - A each diagonal entry is the sum of the row's weights.
    let a = blob_affinity(42);
    let out = LaplacianStage::new(LaplacianConfig::unnormalized())
        .execute(&a)
        .unwrap();
    let lap = out.laplacian.as_matrix();
    assert!(!out.laplacian.is_normalized());

    for (i, row) in lap.row_iter().enumerate() {
        let row_sum: f64 = row.sum();
        assert!(
            abs_diff_eq!(row_sum, 0.0, epsilon = 1e-12),
            "Row {} sum = {:e}, expected 0",
            i,
            row_sum
        );
        assert!(relative_eq!(lap[(i, i)], out.degrees.get(i), epsilon = 1e-12));
    }
}

#[test]
fn test_normalized_structure() {
    init();
    let a = blob_affinity(7);
    let out = LaplacianStage::with_defaults().execute(&a).unwrap();
    let lap = out.laplacian.as_matrix();
    let n = out.laplacian.n_nodes();
    assert!(out.laplacian.is_normalized());

    for i in 0..n {
        // L_sym[i,i] = d_i / d_i = 1 for connected nodes
        assert!(
            relative_eq!(lap[(i, i)], 1.0, epsilon = 1e-12),
            "Diagonal must be 1.0, got {} at {}",
            lap[(i, i)],
            i
        );
        for j in 0..n {
            assert!(
                abs_diff_eq!(lap[(i, j)], lap[(j, i)], epsilon = 1e-15),
                "asymmetry at ({}, {})",
                i,
                j
            );
            if i != j {
                assert!(lap[(i, j)] <= 0.0, "Off-diagonals must be <= 0");
            }
        }
    }
}

#[test]
fn test_normalized_matches_diagonal_sandwich() {
    let a = blob_affinity(99);
    let deg = degree(&a);
    let l = laplacian(&a, &deg).unwrap();
    let l_dense = l.as_matrix().clone();
    let l_sym = normalize(l, &deg).unwrap();

    // Reference: explicit diag(d^-1/2) · L · diag(d^-1/2)
    let d_half = DMatrix::from_diagonal(&deg.inv_sqrt());
    let reference = &d_half * l_dense * &d_half;

    let diff = (l_sym.as_matrix() - reference).abs().max();
    assert!(diff < 1e-12, "max deviation {:e}", diff);
}

#[test]
fn test_laplacian_spectral_bounds_normalized() {
    init();
    // For L_sym eigenvalues MUST lie in [0, 2]. Verified via Rayleigh
    // quotients R(L, x) = (x^T L x) / (x^T x).
    let points = uniform_points(25, 4, 777);
    let a = build(&points, 0.6).unwrap();
    let out = LaplacianStage::with_defaults().execute(&a).unwrap();
    let lap = out.laplacian.as_matrix();
    let n = out.laplacian.n_nodes();

    let mut rng = rand_pcg::Pcg64::seed_from_u64(42);
    for _ in 0..100 {
        let x = DVector::from_fn(n, |_, _| rng.random_range(-1.0..1.0));
        let norm_sq = x.norm_squared();
        if norm_sq < 1e-9 {
            continue;
        }
        let rq = x.dot(&(lap * &x)) / norm_sq;

        assert!(rq >= -1e-10, "Eigenvalue lower bound violation: {}", rq);
        assert!(rq <= 2.0 + 1e-10, "Eigenvalue upper bound violation: {}", rq);
    }
}

#[test]
fn test_laplacian_nullspace() {
    init();
    // THEORY: L_sym · D^{1/2}1 = 0 for every graph without isolated nodes.
    let a = blob_affinity(123);
    let out = LaplacianStage::with_defaults().execute(&a).unwrap();

    let v = DVector::from_iterator(
        out.degrees.len(),
        out.degrees.as_slice().iter().map(|d| d.sqrt()),
    );
    let lv = out.laplacian.as_matrix() * v;

    for (i, val) in lv.iter().enumerate() {
        assert!(
            val.abs() < 1e-10,
            "Nullspace violation at row {}: expected ~0, got {}",
            i,
            val
        );
    }
}

#[test]
fn test_isolated_node_zero_policy() {
    init();
    // Point 2 is so far away that its Gaussian weights underflow to exactly 0.
    let points =
        PointSet::from_rows(&[vec![0.0, 0.0], vec![0.01, 0.0], vec![100.0, 100.0]]).unwrap();
    let a = build(&points, 0.1).unwrap();
    let out = LaplacianStage::with_defaults().execute(&a).unwrap();

    assert_eq!(out.degrees.get(2), 0.0);
    assert_eq!(out.degrees.isolated(), vec![2]);
    assert_eq!(out.laplacian.isolated_nodes(), &[2]);

    let lap = out.laplacian.as_matrix();
    assert!(
        lap.iter().all(|v| v.is_finite()),
        "L_sym must not contain NaN/Inf"
    );
    for j in 0..3 {
        assert_eq!(lap[(2, j)], 0.0);
        assert_eq!(lap[(j, 2)], 0.0);
    }
    // The connected pair keeps its normalised structure.
    assert!(relative_eq!(lap[(0, 0)], 1.0, epsilon = 1e-12));
    assert!(relative_eq!(lap[(0, 1)], -1.0, epsilon = 1e-12));
    assert_eq!(out.degrees.inv_sqrt()[2], 0.0);
}

#[test]
fn test_normalize_validation() {
    let a = blob_affinity(5);
    let deg = degree(&a);
    let l = laplacian(&a, &deg).unwrap();
    let l_sym = normalize(l, &deg).unwrap();

    // already normalized
    assert!(normalize(l_sym, &deg).is_err());

    // degree length mismatch
    let small = build(&uniform_points(3, 2, 1), 1.0).unwrap();
    let small_deg = degree(&small);
    assert!(laplacian(&a, &small_deg).is_err());
    let l = laplacian(&a, &deg).unwrap();
    assert!(normalize(l, &small_deg).is_err());
}
