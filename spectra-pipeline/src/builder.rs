//! Pipeline configuration and its fluent builder.

use log::debug;
use serde::{Deserialize, Serialize};
use spectra_core::{
    AffinityConfig, CentroidInit, KMeansConfig, LaplacianConfig, SpectralConfig,
};

use crate::SpectralPipeline;

/// Every knob of the pipeline in one serialisable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Affinity kernel bandwidth σ (> 0).
    pub sigma: f64,
    /// Number of clusters K, also the embedding width.
    pub n_clusters: usize,
    /// K-means iteration cap.
    pub max_iterations: usize,
    /// K-means seed; `None` draws a fresh one per run.
    pub seed: Option<u64>,
    /// Symmetric normalisation of the Laplacian.
    pub normalize: bool,
    /// Unit-norm embedding rows before K-means.
    pub normalize_rows: bool,
    /// K-means centroid initialisation.
    pub init: CentroidInit,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sigma: AffinityConfig::default().sigma,
            n_clusters: 2,
            max_iterations: KMeansConfig::default().max_iterations,
            seed: None,
            normalize: true,
            normalize_rows: false,
            init: CentroidInit::default(),
        }
    }
}

impl PipelineConfig {
    pub fn affinity(&self) -> AffinityConfig {
        AffinityConfig::with_sigma(self.sigma)
    }

    pub fn laplacian(&self) -> LaplacianConfig {
        LaplacianConfig {
            normalize: self.normalize,
        }
    }

    pub fn spectral(&self) -> SpectralConfig {
        SpectralConfig {
            n_components: self.n_clusters,
            normalize_rows: self.normalize_rows,
        }
    }

    pub fn kmeans(&self) -> KMeansConfig {
        KMeansConfig {
            n_clusters: self.n_clusters,
            max_iterations: self.max_iterations,
            seed: self.seed,
            init: self.init.clone(),
        }
    }
}

/// Fluent construction of a [`SpectralPipeline`].
///
/// ```
/// use spectra_pipeline::PipelineBuilder;
///
/// let pipeline = PipelineBuilder::new()
///     .with_sigma(0.1)
///     .with_clusters(2)
///     .with_seed(42)
///     .build();
/// assert_eq!(pipeline.config().n_clusters, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.config.sigma = sigma;
        self
    }

    pub fn with_clusters(mut self, n_clusters: usize) -> Self {
        self.config.n_clusters = n_clusters;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.config.normalize = normalize;
        self
    }

    pub fn with_row_normalization(mut self, normalize_rows: bool) -> Self {
        self.config.normalize_rows = normalize_rows;
        self
    }

    pub fn with_init(mut self, init: CentroidInit) -> Self {
        self.config.init = init;
        self
    }

    /// Arguments are validated when the pipeline runs, not here.
    pub fn build(self) -> SpectralPipeline {
        debug!("PipelineBuilder::build: {:?}", self.config);
        SpectralPipeline::new(self.config)
    }
}
