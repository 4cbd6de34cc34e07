// spectra-core/src/centroid.rs
use log::{trace, warn};
use nalgebra::DMatrix;
use rand::Rng;
use rand_pcg::Pcg64;

use crate::data::PointSet;
use crate::distance::squared_euclidean_to;
use crate::error::{Result, SpectraError};
use crate::init::CentroidInit;

/// K-means centroid state.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidState {
    pub means: DMatrix<f64>, // [K, d]
    pub counts: Vec<usize>,  // [K], points assigned at the last update
}

impl CentroidState {
    /// Place K starting centroids with the chosen strategy.
    pub fn initialize(
        points: &PointSet,
        k: usize,
        init: &CentroidInit,
        rng: &mut Pcg64,
    ) -> Result<Self> {
        let means = match init {
            CentroidInit::RandomPoints => Self::random_points(points, k, rng),
            CentroidInit::KMeansPlusPlus => Self::kmeans_plusplus(points, k, rng),
            CentroidInit::Provided(rows) => Self::provided(points, k, rows)?,
        };
        Ok(Self {
            means,
            counts: vec![0; k],
        })
    }

    fn random_points(points: &PointSet, k: usize, rng: &mut Pcg64) -> DMatrix<f64> {
        let picked = rand::seq::index::sample(rng, points.n_points(), k).into_vec();
        trace!("random init rows: {:?}", picked);
        Self::gather_rows(points, &picked)
    }

    fn kmeans_plusplus(points: &PointSet, k: usize, rng: &mut Pcg64) -> DMatrix<f64> {
        let x = points.as_matrix();
        let m = points.n_points();

        let mut chosen = Vec::with_capacity(k);
        let mut taken = vec![false; m];
        let first = rng.random_range(0..m);
        chosen.push(first);
        taken[first] = true;

        let c0 = points.row(first);
        let mut min_d2: Vec<f64> = (0..m).map(|i| squared_euclidean_to(x, i, &c0)).collect();

        while chosen.len() < k {
            let total: f64 = min_d2.iter().sum();
            let next = if total > 0.0 {
                let target = rng.random::<f64>() * total;
                let mut acc = 0.0;
                let mut pick = None;
                for (i, &d2) in min_d2.iter().enumerate() {
                    if d2 <= 0.0 {
                        continue;
                    }
                    acc += d2;
                    pick = Some(i);
                    if acc >= target {
                        break;
                    }
                }
                // total > 0 guarantees at least one positive weight
                pick.unwrap_or(first)
            } else {
                // Every remaining point coincides with a centroid.
                let free: Vec<usize> = (0..m).filter(|&i| !taken[i]).collect();
                free[rng.random_range(0..free.len())]
            };

            chosen.push(next);
            taken[next] = true;
            let c = points.row(next);
            for (i, d) in min_d2.iter_mut().enumerate() {
                *d = d.min(squared_euclidean_to(x, i, &c));
            }
        }

        trace!("k-means++ init rows: {:?}", chosen);
        Self::gather_rows(points, &chosen)
    }

    fn provided(points: &PointSet, k: usize, rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
        let d = points.dim();
        if rows.len() != k {
            return Err(SpectraError::invalid(format!(
                "provided {} initial centroids for K={}",
                rows.len(),
                k
            )));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != d) {
            return Err(SpectraError::invalid(format!(
                "initial centroid {} has {} dimensions, points have {}",
                bad,
                rows[bad].len(),
                d
            )));
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(SpectraError::invalid("initial centroids must be finite"));
        }
        Ok(DMatrix::from_fn(k, d, |r, c| rows[r][c]))
    }

    fn gather_rows(points: &PointSet, idx: &[usize]) -> DMatrix<f64> {
        let x = points.as_matrix();
        DMatrix::from_fn(idx.len(), points.dim(), |r, c| x[(idx[r], c)])
    }

    /// Index of the closest centroid to point `i` and its squared distance.
    /// Ties go to the lowest centroid index.
    pub fn nearest(&self, x: &DMatrix<f64>, i: usize) -> (usize, f64) {
        let mut best = (0usize, f64::INFINITY);
        for k in 0..self.num_centroids() {
            let d2 = squared_euclidean_to(x, i, &self.means.row(k).into_owned());
            if d2 < best.1 {
                best = (k, d2);
            }
        }
        best
    }

    /// Nearest-centroid label for every row of `x`.
    pub fn assign(&self, x: &DMatrix<f64>) -> Vec<usize> {
        (0..x.nrows()).map(|i| self.nearest(x, i).0).collect()
    }

    /// Move each centroid to the mean of its assigned points.
    ///
    /// A centroid that received no points keeps its previous position.
    /// Returns the indices of such empty clusters.
    pub fn update(&mut self, x: &DMatrix<f64>, labels: &[usize]) -> Vec<usize> {
        let (k, d) = self.means.shape();
        let mut sums = DMatrix::<f64>::zeros(k, d);
        let mut counts = vec![0usize; k];

        for (i, &label) in labels.iter().enumerate() {
            counts[label] += 1;
            let mut acc = sums.row_mut(label);
            acc += x.row(i);
        }

        let mut empty = Vec::new();
        for c in 0..k {
            if counts[c] == 0 {
                empty.push(c);
                continue;
            }
            let mean = sums.row(c) / counts[c] as f64;
            self.means.set_row(c, &mean);
        }

        if !empty.is_empty() {
            warn!(
                "{} empty cluster(s) {:?}; keeping their previous centroids",
                empty.len(),
                empty
            );
        }

        self.counts = counts;
        empty
    }

    /// Within-cluster sum of squared distances for the given labels.
    pub fn inertia(&self, x: &DMatrix<f64>, labels: &[usize]) -> f64 {
        labels
            .iter()
            .enumerate()
            .map(|(i, &c)| squared_euclidean_to(x, i, &self.means.row(c).into_owned()))
            .sum()
    }

    pub fn num_centroids(&self) -> usize {
        self.means.nrows()
    }

    pub fn feature_dim(&self) -> usize {
        self.means.ncols()
    }
}
