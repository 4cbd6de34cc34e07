//! Error taxonomy shared by every stage.
//!
//! Only malformed arguments surface as errors. Isolated nodes during
//! normalisation are absorbed by the zero-factor policy in
//! [`crate::laplacian`], and K-means non-convergence is reported through
//! [`crate::clustering::KMeansOutput::converged`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectraError {
    /// Malformed K, sigma, shape or point-set size.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, SpectraError>;

impl SpectraError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SpectraError::InvalidArgument(msg.into())
    }
}
