//! Expression model collaborators: normalization, transformation and PCA
//!
//! The negative-binomial fit and variance-stabilizing transform belong to an
//! external statistics package. [`ExpressionModel`] is the seam: the
//! workflow hands over filtered counts and metadata and receives normalized
//! and transformed matrices plus sample PCA coordinates.

mod pca;
mod precomputed;
mod shifted_log;
mod size_factors;

use serde::{Deserialize, Serialize};

use crate::data::{CountMatrix, ExpressionMatrix, SampleMetadata};
use crate::error::{DgeError, Result};

pub use pca::{principal_components, PcaResult};
pub use precomputed::PrecomputedModel;
pub use shifted_log::ShiftedLogModel;
pub use size_factors::{estimate_size_factors, SizeFactorMethod};

/// Everything the workflow needs back from an expression model
#[derive(Debug, Clone)]
pub struct ModelFit {
    /// Per-sample size factors, when the model exposes them
    pub size_factors: Option<Vec<f64>>,
    /// Depth-normalized counts, same shape as the filtered counts
    pub normalized: ExpressionMatrix,
    /// Transformed values used for distance-based analyses
    pub transformed: ExpressionMatrix,
    pub pca: PcaResult,
}

/// A model that normalizes and transforms a filtered count matrix
pub trait ExpressionModel {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Fit using `factor` as the explanatory variable of `samples`
    fn fit(&self, counts: &CountMatrix, samples: &SampleMetadata, factor: &str) -> Result<ModelFit>;
}

/// Settings shared by the bundled models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub size_factors: SizeFactorMethod,
    /// Added to normalized counts before the log2 transform
    pub pseudocount: f64,
    /// Number of most variable genes used for PCA
    pub ntop: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            size_factors: SizeFactorMethod::Ratio,
            pseudocount: 1.0,
            ntop: 500,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.pseudocount > 0.0 && self.pseudocount.is_finite()) {
            return Err(DgeError::InvalidConfig {
                reason: format!("pseudocount must be positive, got {}", self.pseudocount),
            });
        }
        if self.ntop == 0 {
            return Err(DgeError::InvalidConfig {
                reason: "ntop must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Fail unless `factor` is the condition column of `samples` and has levels
/// to contrast
pub(crate) fn check_design(samples: &SampleMetadata, factor: &str) -> Result<()> {
    if samples.condition_name() != factor {
        return Err(DgeError::ExternalModel {
            stage: "design setup".to_string(),
            reason: format!(
                "factor '{}' is not a metadata factor (available: '{}')",
                factor,
                samples.condition_name()
            ),
        });
    }
    let observed = samples.condition().observed_levels_sorted();
    if observed.len() < 2 {
        log::warn!(
            "Factor '{}' has only one observed level ('{}')",
            factor,
            observed.first().map(String::as_str).unwrap_or("")
        );
    }
    Ok(())
}
