// spectra-pipeline/src/stages/clustering.rs
//! Baseline vs spectral clustering on the same points.
//!
//! K-means straight on the input coordinates only finds convex groups;
//! K-means on the spectral embedding follows graph connectivity. Running
//! both with the same K and seed makes the difference visible.
//!
//! The two runs live in different spaces (d input dimensions vs K embedding
//! dimensions), so provided centroids for the baseline are configured
//! separately through `baseline_init`.

use log::{debug, info};
use spectra_core::{
    same_partition, CentroidInit, KMeansConfig, KMeansOutput, KMeansStage, PointSet, Result,
};

use crate::{PipelineConfig, PipelineOutput, SpectralPipeline};

pub struct ComparisonStage {
    pub config: PipelineConfig,
    /// Initialisation for the raw-point run; `None` reuses `config.init`.
    pub baseline_init: Option<CentroidInit>,
}

pub struct ComparisonOutput {
    /// K-means on the raw points.
    pub baseline: KMeansOutput,
    /// Full spectral pipeline.
    pub spectral: PipelineOutput,
}

impl ComparisonOutput {
    /// Whether both methods found the same partition (up to relabelling).
    pub fn agree(&self) -> bool {
        same_partition(&self.baseline.labels, &self.spectral.labels)
    }
}

impl ComparisonStage {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            baseline_init: None,
        }
    }

    pub fn with_baseline_init(mut self, init: CentroidInit) -> Self {
        self.baseline_init = Some(init);
        self
    }

    pub fn execute(&self, points: &PointSet) -> Result<ComparisonOutput> {
        // One seed for both runs, even when the config leaves it open.
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let config = PipelineConfig {
            seed: Some(seed),
            ..self.config.clone()
        };

        info!(
            "🎯 Comparing K-means vs spectral clustering (K={})",
            config.n_clusters
        );
        debug!("  shared seed={}", seed);

        let baseline_config = KMeansConfig {
            init: self
                .baseline_init
                .clone()
                .unwrap_or_else(|| config.init.clone()),
            ..config.kmeans()
        };
        let baseline = KMeansStage::new(baseline_config).execute(points)?;
        let spectral = SpectralPipeline::new(config).run(points)?;

        let out = ComparisonOutput { baseline, spectral };
        info!(
            "✓ Comparison complete: baseline inertia={:.4e}, partitions agree={}",
            out.baseline.inertia,
            out.agree()
        );
        Ok(out)
    }
}
