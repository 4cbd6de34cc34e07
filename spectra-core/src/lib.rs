//! # spectra-core
//!
//! Dense spectral graph clustering for small-to-medium point sets.
//!
//! ```text
//! PointSet [m, d]
//!   → A. affinity     Gaussian kernel, A [m, m], zero diagonal
//!   → B. laplacian    degree [m], L_sym = D^{-½}(D − A)D^{-½}
//!   → C. spectral     ascending eigenpairs, embedding [m, K]
//!   → D. clustering   K-means on the embedding → labels [m]
//! ```
//!
//! Every stage is a `*Stage` executor configured by a serde-serialisable
//! `*Config`, plus a free function mirroring the stage contract
//! (`affinity::build`, `laplacian::{degree, laplacian, normalize}`,
//! `spectral::{decompose, select}`, `clustering::cluster`). Stages log via the
//! `log` facade; install any backend (e.g. `env_logger`) to see them.
//!
//! All artifacts are freshly allocated per call and nothing is shared, so
//! independent point sets can be processed on separate threads.

pub mod affinity;
pub mod centroid;
pub mod clustering;
pub mod data;
pub mod distance;
pub mod error;
pub mod init;
pub mod laplacian;
pub mod spectral;

pub use affinity::{AffinityConfig, AffinityMatrix, AffinityStage};
pub use clustering::{partition_groups, same_partition, KMeansConfig, KMeansOutput, KMeansStage};
pub use data::PointSet;
pub use error::{Result, SpectraError};
pub use init::CentroidInit;
pub use laplacian::{DegreeVector, Laplacian, LaplacianConfig, LaplacianOutput, LaplacianStage};
pub use spectral::{EigenPairs, Embedding, SpectralConfig, SpectralOutput, SpectralStage};

#[cfg(test)]
mod tests;
