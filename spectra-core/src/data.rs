// spectra-core/src/data.rs
//! Input point sets.
//!
//! A [`PointSet`] is an immutable m×d matrix of finite reals, one row per
//! point. It is the only artifact the core receives from the outside world;
//! dataset generators and loaders live with the caller.

use log::debug;
use nalgebra::{DMatrix, RowDVector};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{Result, SpectraError};

#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    matrix: DMatrix<f64>, // [m, d]
}

impl PointSet {
    /// Build from one `Vec<f64>` per point. All rows must share one length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let m = rows.len();
        if m == 0 {
            return Err(SpectraError::invalid("point set is empty"));
        }
        let d = rows[0].len();
        if d == 0 {
            return Err(SpectraError::invalid("points have zero dimensions"));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != d) {
            return Err(SpectraError::invalid(format!(
                "row {} has {} dimensions, expected {}",
                bad,
                rows[bad].len(),
                d
            )));
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from_vec(flat, m, d)
    }

    /// Build from a flat row-major buffer `[m * d]`.
    pub fn from_vec(data: Vec<f64>, m: usize, d: usize) -> Result<Self> {
        if m == 0 || d == 0 {
            return Err(SpectraError::invalid(format!(
                "point set shape must be non-empty, got {}x{}",
                m, d
            )));
        }
        if data.len() != m * d {
            return Err(SpectraError::invalid(format!(
                "buffer of length {} does not match shape {}x{}",
                data.len(),
                m,
                d
            )));
        }
        if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
            return Err(SpectraError::invalid(format!(
                "non-finite coordinate at point {}, dim {}",
                idx / d,
                idx % d
            )));
        }

        debug!("PointSet: {} points x {} dims", m, d);
        Ok(Self {
            matrix: DMatrix::from_row_slice(m, d, &data),
        })
    }

    /// Interop with callers holding a smartcore `DenseMatrix` (rows = points).
    pub fn from_dense(dm: &DenseMatrix<f64>) -> Result<Self> {
        let (m, d) = dm.shape();
        let mut flat = Vec::with_capacity(m * d);
        for i in 0..m {
            flat.extend((0..d).map(|c| *dm.get((i, c))));
        }
        Self::from_vec(flat, m, d)
    }

    pub(crate) fn from_matrix(matrix: DMatrix<f64>) -> Self {
        Self { matrix }
    }

    /// Number of points m.
    pub fn n_points(&self) -> usize {
        self.matrix.nrows()
    }

    /// Dimension d of every point.
    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn row(&self, i: usize) -> RowDVector<f64> {
        self.matrix.row(i).into_owned()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Rows reordered so that new row `k` is old row `order[k]`.
    pub fn permuted(&self, order: &[usize]) -> Result<Self> {
        let m = self.n_points();
        let mut seen = vec![false; m];
        if order.len() != m
            || order
                .iter()
                .any(|&i| i >= m || std::mem::replace(&mut seen[i], true))
        {
            return Err(SpectraError::invalid(format!(
                "order is not a permutation of 0..{}",
                m
            )));
        }
        let d = self.dim();
        Ok(Self::from_matrix(DMatrix::from_fn(m, d, |r, c| {
            self.matrix[(order[r], c)]
        })))
    }
}
