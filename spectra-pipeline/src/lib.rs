//! # spectra-pipeline
//!
//! Orchestrates the spectra-core stages in order:
//!
//! 1. Affinity   points → A
//! 2. Laplacian  A → (degree, L_sym)
//! 3. Spectral   L_sym → eigenpairs → embedding [m, K]
//! 4. K-means    embedding → labels
//!
//! Any stage failure propagates unchanged and no partial result is returned.
//! Rendering and reporting of the output are left to the caller.
pub mod builder;
pub mod stages;

use log::info;
use rayon::prelude::*;
use spectra_core::{
    AffinityStage, Embedding, KMeansOutput, KMeansStage, LaplacianStage, PointSet, Result,
    SpectralStage,
};

pub use builder::{PipelineBuilder, PipelineConfig};
pub use stages::clustering::{ComparisonOutput, ComparisonStage};

/// Terminal artifact of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Cluster index in [0, K) per input point.
    pub labels: Vec<usize>,
    /// The m×K spectral embedding the labels were computed on.
    pub embedding: Embedding,
    /// The K smallest eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
    /// Number of eigenvalues ≈ 0, an estimate of connected components.
    pub n_components_estimate: usize,
    /// Nodes with zero degree in the similarity graph.
    pub isolated: Vec<usize>,
    /// Full K-means diagnostics on the embedding.
    pub kmeans: KMeansOutput,
}

/// Tolerance used for `PipelineOutput::n_components_estimate`.
pub const ZERO_EIGENVALUE_TOL: f64 = 1e-8;

/// Points → labels + embedding.
#[derive(Debug, Clone)]
pub struct SpectralPipeline {
    config: PipelineConfig,
}

impl SpectralPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all four stages on one point set.
    pub fn run(&self, points: &PointSet) -> Result<PipelineOutput> {
        info!(
            "🚀 Spectral pipeline: m={}, d={}, sigma={}, K={}",
            points.n_points(),
            points.dim(),
            self.config.sigma,
            self.config.n_clusters
        );

        let affinity = AffinityStage::new(self.config.affinity()).execute(points)?;
        info!("✓ Stage A: affinity {}x{}", affinity.n_nodes(), affinity.n_nodes());

        let lap = LaplacianStage::new(self.config.laplacian()).execute(&affinity)?;
        info!("✓ Stage B: {}", lap.laplacian.summary());

        let spectral = SpectralStage::new(self.config.spectral()).execute(&lap.laplacian)?;
        let k = spectral.embedding.n_components();
        let eigenvalues = spectral.pairs.eigenvalues()[..k].to_vec();
        info!("✓ Stage C: eigenvalues[0..{}] = {:?}", k, eigenvalues);

        let kmeans =
            KMeansStage::new(self.config.kmeans()).execute(&spectral.embedding.to_point_set())?;
        info!("✓ Stage D: {}", kmeans.summary());

        Ok(PipelineOutput {
            labels: kmeans.labels.clone(),
            n_components_estimate: spectral.pairs.near_zero_count(ZERO_EIGENVALUE_TOL),
            isolated: lap.laplacian.isolated_nodes().to_vec(),
            embedding: spectral.embedding,
            eigenvalues,
            kmeans,
        })
    }

    /// Run independent point sets in parallel; results keep input order.
    pub fn run_batch(&self, sets: &[PointSet]) -> Vec<Result<PipelineOutput>> {
        info!("Spectral pipeline batch: {} point sets", sets.len());
        sets.par_iter().map(|points| self.run(points)).collect()
    }
}

/// `run(points, sigma, K) -> (labels, embedding)` with default settings.
pub fn run(points: &PointSet, sigma: f64, k: usize) -> Result<(Vec<usize>, Embedding)> {
    let out = PipelineBuilder::new()
        .with_sigma(sigma)
        .with_clusters(k)
        .build()
        .run(points)?;
    Ok((out.labels, out.embedding))
}

#[cfg(test)]
mod tests;
