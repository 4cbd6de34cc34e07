//! Stage D: K-means sub-clustering.
//!
//! Lloyd iterations over any m×d point set. The same executor runs on the raw
//! input points (baseline) and on the spectral embedding (the actual spectral
//! clustering result); only the input matrix differs.
//!
//! Loop: assign every point to its nearest centroid, move centroids to the
//! mean of their points, repeat until the assignment stops changing or
//! `max_iterations` assignment passes have run. Hitting the cap is not an
//! error: the last labels are returned with `converged = false`.
//!
//! Initialisation is random unless centroids are provided. The generator is
//! an explicit `Pcg64` seeded from `KMeansConfig::seed`; with no seed a fresh
//! one is drawn and logged so the run can be replayed.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::centroid::CentroidState;
use crate::data::PointSet;
use crate::error::{Result, SpectraError};
use crate::init::CentroidInit;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Number of clusters K.
    pub n_clusters: usize,

    /// Cap on assignment passes; guarantees termination.
    pub max_iterations: usize,

    /// Seed for centroid initialisation. `None` draws a fresh seed.
    pub seed: Option<u64>,

    /// Initial centroid placement.
    pub init: CentroidInit,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            max_iterations: 100,
            seed: None,
            init: CentroidInit::default(),
        }
    }
}

impl KMeansConfig {
    /// K clusters, everything else default.
    pub fn with_clusters(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }

    /// Reproducible configuration with a fixed seed.
    pub fn seeded(n_clusters: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn validate(&self, n_points: usize) -> Result<()> {
        if self.n_clusters < 1 || self.n_clusters > n_points {
            return Err(SpectraError::invalid(format!(
                "K must be in [1, {}], got {}",
                n_points, self.n_clusters
            )));
        }
        if self.max_iterations == 0 {
            return Err(SpectraError::invalid("max_iterations must be >= 1"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output type
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KMeansOutput {
    /// Cluster index in [0, K) per point.
    pub labels: Vec<usize>,

    /// Final centroids [K, d].
    pub centroids: DMatrix<f64>,

    /// Assignment passes run.
    pub n_iter: usize,

    /// False when `max_iterations` was reached with assignments still moving.
    pub converged: bool,

    /// Within-cluster sum of squared distances.
    pub inertia: f64,

    /// Seed actually used for initialisation.
    pub seed: u64,
}

impl KMeansOutput {
    /// Assign new points to the fitted centroids.
    pub fn predict(&self, points: &PointSet) -> Result<Vec<usize>> {
        if points.dim() != self.centroids.ncols() {
            return Err(SpectraError::invalid(format!(
                "points have {} dimensions, centroids have {}",
                points.dim(),
                self.centroids.ncols()
            )));
        }
        let state = CentroidState {
            means: self.centroids.clone(),
            counts: Vec::new(),
        };
        Ok(state.assign(points.as_matrix()))
    }

    /// Number of distinct labels actually used.
    pub fn n_used_labels(&self) -> usize {
        partition_groups(&self.labels).len()
    }

    pub fn summary(&self) -> String {
        format!(
            "KMeansOutput: K={}, used={}, n_iter={}, converged={}, inertia={:.6e}",
            self.centroids.nrows(),
            self.n_used_labels(),
            self.n_iter,
            self.converged,
            self.inertia
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage executor
// ─────────────────────────────────────────────────────────────────────────────

/// Stage D executor.
pub struct KMeansStage {
    pub config: KMeansConfig,
}

impl KMeansStage {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(KMeansConfig::default())
    }

    /// Execute Stage D on raw points or on an embedding turned into points.
    ///
    /// Fails with `InvalidArgument` if K is outside [1, m], `max_iterations`
    /// is 0, or provided centroids do not match K × d.
    pub fn execute(&self, points: &PointSet) -> Result<KMeansOutput> {
        let m = points.n_points();
        self.config.validate(m)?;
        let k = self.config.n_clusters;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg64::seed_from_u64(seed);

        info!("╔═══════════════════════════════════════════════════════╗");
        info!("║  STAGE D: K-MEANS                                     ║");
        info!("╚═══════════════════════════════════════════════════════╝");
        info!(
            "  • m={}, d={}, K={}, max_iter={}, init={}",
            m,
            points.dim(),
            k,
            self.config.max_iterations,
            self.config.init
        );
        debug!("  seed={}", seed);

        let x = points.as_matrix();
        let mut state = CentroidState::initialize(points, k, &self.config.init, &mut rng)?;

        let mut labels: Option<Vec<usize>> = None;
        let mut converged = false;
        let mut n_iter = 0;

        while n_iter < self.config.max_iterations {
            n_iter += 1;
            let next = state.assign(x);

            if labels.as_ref() == Some(&next) {
                converged = true;
                debug!("  assignments stable after {} passes", n_iter);
                break;
            }

            state.update(x, &next);
            labels = Some(next);
        }

        // max_iterations >= 1 so at least one pass has stored labels
        let labels = labels.unwrap_or_else(|| state.assign(x));

        if !converged {
            warn!(
                "K-means did not converge within {} iterations; returning labels at cutoff",
                self.config.max_iterations
            );
        }

        let inertia = state.inertia(x, &labels);
        let out = KMeansOutput {
            labels,
            centroids: state.means,
            n_iter,
            converged,
            inertia,
            seed,
        };
        info!("  ✓ {}", out.summary());

        Ok(out)
    }
}

/// Convenience wrapper: `cluster(points, K, init?)` with default iterations.
pub fn cluster(
    points: &PointSet,
    k: usize,
    init: Option<CentroidInit>,
    seed: Option<u64>,
) -> Result<KMeansOutput> {
    let config = KMeansConfig {
        n_clusters: k,
        seed,
        init: init.unwrap_or_default(),
        ..Default::default()
    };
    KMeansStage::new(config).execute(points)
}

// ─────────────────────────────────────────────────────────────────────────────
// Partition helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Index groups of a labelling, independent of label values.
///
/// Each group is sorted; groups are ordered by their smallest member.
pub fn partition_groups(labels: &[usize]) -> Vec<Vec<usize>> {
    let mut by_label: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &l) in labels.iter().enumerate() {
        by_label.entry(l).or_default().push(i);
    }
    let mut groups: Vec<Vec<usize>> = by_label.into_values().collect();
    groups.sort_by_key(|g| g[0]);
    groups
}

/// True when two labellings induce the same partition up to relabelling.
pub fn same_partition(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len() && partition_groups(a) == partition_groups(b)
}
