//! CentroidInit: strategy for placing the K starting centroids.

use serde::{Deserialize, Serialize};

/// How K-means picks its initial centroids.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CentroidInit {
    /// K distinct input rows drawn uniformly at random.
    RandomPoints,
    /// D²-weighted seeding: each new centroid is drawn with probability
    /// proportional to its squared distance from the nearest chosen one.
    #[default]
    KMeansPlusPlus,
    /// Caller-supplied centroids, one `Vec<f64>` per cluster.
    Provided(Vec<Vec<f64>>),
}

impl std::fmt::Display for CentroidInit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CentroidInit::RandomPoints => write!(f, "RandomPoints"),
            CentroidInit::KMeansPlusPlus => write!(f, "KMeans++"),
            CentroidInit::Provided(c) => write!(f, "Provided({})", c.len()),
        }
    }
}
