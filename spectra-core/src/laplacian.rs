//! Stage B: Graph Laplacian construction.
//!
//! Pipeline position: A [m, m] affinity → degree [m] → L [m, m].
//!
//! Two forms are produced:
//!   unnormalised            L     = D − A
//!   symmetric normalised    L_sym = D^{-½} (D − A) D^{-½}
//!
//! L_sym has eigenvalues in [0, 2] regardless of degree and removes the bias
//! toward high-degree nodes, which is what the eigen-embedding stage wants.
//! `LaplacianConfig::normalize = false` keeps the unnormalised form.
//!
//! ### Isolated nodes
//! A node whose degree is exactly 0 has no defined D^{-½} entry. Its
//! normalisation factor is taken as 0, so its row and column of L_sym are 0.
//! The node contributes no coupling and a zero eigenvalue, and L_sym stays
//! positive semi-definite. No NaN/Inf can reach the eigensolver.

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::affinity::AffinityMatrix;
use crate::error::{Result, SpectraError};
use crate::spectral::bridge::scale_symmetric;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the Laplacian stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaplacianConfig {
    /// If true, build L_sym = D^{-½} (D − A) D^{-½}.
    /// If false, build the unnormalised L = D − A.
    pub normalize: bool,
}

impl Default for LaplacianConfig {
    fn default() -> Self {
        Self { normalize: true }
    }
}

impl LaplacianConfig {
    pub fn unnormalized() -> Self {
        Self { normalize: false }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Artifacts
// ─────────────────────────────────────────────────────────────────────────────

/// Per-node weighted degree, `degree[i] = Σ_j A[i][j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeVector {
    values: DVector<f64>,
}

impl DegreeVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Indices with zero degree.
    pub fn isolated(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &d)| d <= 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// D^{-½} with the zero-degree policy applied: factor 0 for isolated nodes.
    pub fn inv_sqrt(&self) -> DVector<f64> {
        self.values
            .map(|d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
    }
}

/// Symmetric Laplacian matrix [m, m], normalised or not.
#[derive(Debug, Clone, PartialEq)]
pub struct Laplacian {
    matrix: DMatrix<f64>,
    normalized: bool,
    isolated: Vec<usize>,
}

impl Laplacian {
    pub fn n_nodes(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.matrix
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Nodes that had zero degree when this Laplacian was built.
    pub fn isolated_nodes(&self) -> &[usize] {
        &self.isolated
    }

    pub fn summary(&self) -> String {
        format!(
            "Laplacian: m={}, normalized={}, isolated={}, trace={:.4}",
            self.n_nodes(),
            self.normalized,
            self.isolated.len(),
            self.matrix.trace()
        )
    }
}

/// Output of Stage B.
#[derive(Debug, Clone)]
pub struct LaplacianOutput {
    pub degrees: DegreeVector,
    pub laplacian: Laplacian,
}

// ─────────────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Row sums of the affinity matrix.
pub fn degree(a: &AffinityMatrix) -> DegreeVector {
    let m = a.as_matrix();
    let values = DVector::from_iterator(m.nrows(), m.row_iter().map(|r| r.sum()));
    DegreeVector { values }
}

/// Unnormalised Laplacian `L = diag(degree) − A`.
pub fn laplacian(a: &AffinityMatrix, degree: &DegreeVector) -> Result<Laplacian> {
    let n = a.n_nodes();
    if degree.len() != n {
        return Err(SpectraError::invalid(format!(
            "degree length {} does not match affinity size {}",
            degree.len(),
            n
        )));
    }

    let mut l = -a.as_matrix().clone();
    for i in 0..n {
        l[(i, i)] += degree.get(i);
    }

    Ok(Laplacian {
        matrix: l,
        normalized: false,
        isolated: degree.isolated(),
    })
}

/// Symmetric normalisation `L_sym = D^{-½} · L · D^{-½}`, isolated nodes → 0.
///
/// Consumes `l`: the unnormalised matrix is overwritten in place.
pub fn normalize(l: Laplacian, degree: &DegreeVector) -> Result<Laplacian> {
    let n = l.n_nodes();
    if degree.len() != n {
        return Err(SpectraError::invalid(format!(
            "degree length {} does not match Laplacian size {}",
            degree.len(),
            n
        )));
    }
    if l.normalized {
        return Err(SpectraError::invalid("Laplacian is already normalized"));
    }

    let isolated = degree.isolated();
    if !isolated.is_empty() {
        warn!(
            "{} isolated node(s) with zero degree; their L_sym rows/cols are set to 0: {:?}",
            isolated.len(),
            isolated
        );
    }

    let factors = degree.inv_sqrt();
    let matrix = scale_symmetric(l.matrix, &factors);

    Ok(Laplacian {
        matrix,
        normalized: true,
        isolated,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage executor
// ─────────────────────────────────────────────────────────────────────────────

/// Stage B executor: degree vector and (normalised) Laplacian from affinity.
pub struct LaplacianStage {
    pub config: LaplacianConfig,
}

impl LaplacianStage {
    pub fn new(config: LaplacianConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(LaplacianConfig::default())
    }

    /// Execute Stage B.
    pub fn execute(&self, a: &AffinityMatrix) -> Result<LaplacianOutput> {
        info!("╔═══════════════════════════════════════════════════════╗");
        info!("║  STAGE B: GRAPH LAPLACIAN                             ║");
        info!("╚═══════════════════════════════════════════════════════╝");
        info!(
            "  • m={}, normalize={}",
            a.n_nodes(),
            self.config.normalize
        );

        debug!("Step 1/2: degree vector");
        let degrees = degree(a);
        let (dmin, dmax) = degrees
            .as_slice()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            });
        debug!("  degree range: [{:.6e}, {:.6e}]", dmin, dmax);

        debug!("Step 2/2: L = D − A");
        let mut lap = laplacian(a, &degrees)?;
        if self.config.normalize {
            debug!("  normalising: L_sym = D^-1/2 L D^-1/2");
            lap = normalize(lap, &degrees)?;
        }

        info!("  ✓ {}", lap.summary());

        Ok(LaplacianOutput {
            degrees,
            laplacian: lap,
        })
    }
}
