//! Median-of-ratios normalization followed by a shifted log2 transform

use ndarray::Axis;

use super::{check_design, estimate_size_factors, principal_components, ExpressionModel, ModelConfig, ModelFit};
use crate::data::{CountMatrix, ExpressionMatrix, SampleMetadata};
use crate::error::Result;

/// Blind QC model: counts divided by size factors, then
/// `log2(normalized + pseudocount)`.
#[derive(Debug, Clone, Default)]
pub struct ShiftedLogModel {
    config: ModelConfig,
}

impl ShiftedLogModel {
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl ExpressionModel for ShiftedLogModel {
    fn name(&self) -> &str {
        "shifted-log"
    }

    fn fit(&self, counts: &CountMatrix, samples: &SampleMetadata, factor: &str) -> Result<ModelFit> {
        check_design(samples, factor)?;

        let raw = counts.to_f64();
        let size_factors = estimate_size_factors(raw.view(), self.config.size_factors)?;
        log::debug!("Size factors: {:?}", size_factors.to_vec());

        let normalized = &raw / &size_factors.view().insert_axis(Axis(0));
        let pseudocount = self.config.pseudocount;
        let transformed = normalized.mapv(|x| (x + pseudocount).log2());

        let gene_ids = counts.gene_ids().to_vec();
        let sample_ids = counts.sample_ids().to_vec();
        let normalized = ExpressionMatrix::new(normalized, gene_ids.clone(), sample_ids.clone())?;
        let transformed = ExpressionMatrix::new(transformed, gene_ids, sample_ids)?;
        let pca = principal_components(&transformed, self.config.ntop)?;

        Ok(ModelFit {
            size_factors: Some(size_factors.to_vec()),
            normalized,
            transformed,
            pca,
        })
    }
}
