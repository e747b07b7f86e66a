//! Model results computed by an external statistics package and saved to disk

use std::collections::HashMap;
use std::path::PathBuf;

use ndarray::Array2;

use super::{check_design, principal_components, ExpressionModel, ModelFit};
use crate::condition::SampleIdNormalizer;
use crate::data::{CountMatrix, ExpressionMatrix, SampleMetadata};
use crate::error::{DgeError, Result};
use crate::io::read_expression_matrix;

/// Loads normalized counts and variance-stabilized values (e.g. DESeq2's
/// `counts(dds, normalized=TRUE)` and `assay(vst(dds))` written as tables)
/// and aligns them to the filtered count matrix by identifier.
///
/// Sample headers of the tables go through the same [`SampleIdNormalizer`]
/// as the counts file, so raw names such as `S-1` match `S__1`.
#[derive(Debug, Clone)]
pub struct PrecomputedModel {
    normalized_path: PathBuf,
    transformed_path: PathBuf,
    id_column: String,
    ntop: usize,
    normalizer: SampleIdNormalizer,
}

impl PrecomputedModel {
    pub fn new<P: Into<PathBuf>>(normalized_path: P, transformed_path: P, id_column: &str, ntop: usize) -> Self {
        Self {
            normalized_path: normalized_path.into(),
            transformed_path: transformed_path.into(),
            id_column: id_column.to_string(),
            ntop,
            normalizer: SampleIdNormalizer::default(),
        }
    }

    /// Use the sample id normalizer the counts were read with
    pub fn with_normalizer(mut self, normalizer: SampleIdNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn load(&self, path: &PathBuf, stage: &str, counts: &CountMatrix) -> Result<ExpressionMatrix> {
        let model_error = |reason: String| DgeError::ExternalModel {
            stage: stage.to_string(),
            reason: format!("{}: {}", path.display(), reason),
        };

        let matrix = read_expression_matrix(path, &self.id_column).map_err(|e| model_error(e.to_string()))?;
        align_to_counts(&matrix, counts, &self.normalizer).map_err(model_error)
    }
}

/// Reorder rows and columns of `matrix` to those of `counts`
///
/// Headers already equal to a count sample id are kept; others are
/// normalized first.
fn align_to_counts(
    matrix: &ExpressionMatrix,
    counts: &CountMatrix,
    normalizer: &SampleIdNormalizer,
) -> std::result::Result<ExpressionMatrix, String> {
    let gene_rows: HashMap<&str, usize> = matrix
        .gene_ids()
        .iter()
        .enumerate()
        .map(|(i, g)| (g.as_str(), i))
        .collect();

    let mut sample_cols: HashMap<String, usize> = HashMap::new();
    for (j, raw) in matrix.sample_ids().iter().enumerate() {
        let id = if counts.sample_index(raw).is_some() {
            raw.clone()
        } else {
            normalizer.normalize(raw).map_err(|e| e.to_string())?
        };
        if sample_cols.insert(id.clone(), j).is_some() {
            return Err(format!("sample '{}' appears twice after id normalization", id));
        }
    }

    let rows = counts
        .gene_ids()
        .iter()
        .map(|g| gene_rows.get(g.as_str()).copied().ok_or_else(|| format!("gene '{}' missing", g)))
        .collect::<std::result::Result<Vec<usize>, String>>()?;
    let cols = counts
        .sample_ids()
        .iter()
        .map(|s| sample_cols.get(s.as_str()).copied().ok_or_else(|| format!("sample '{}' missing", s)))
        .collect::<std::result::Result<Vec<usize>, String>>()?;

    if matrix.n_genes() != rows.len() {
        log::warn!(
            "Ignoring {} precomputed genes not present after filtering",
            matrix.n_genes() - rows.len()
        );
    }

    let data = Array2::from_shape_fn((rows.len(), cols.len()), |(i, j)| matrix.data()[[rows[i], cols[j]]]);
    ExpressionMatrix::new(data, counts.gene_ids().to_vec(), counts.sample_ids().to_vec())
        .map_err(|e| e.to_string())
}

impl ExpressionModel for PrecomputedModel {
    fn name(&self) -> &str {
        "precomputed"
    }

    fn fit(&self, counts: &CountMatrix, samples: &SampleMetadata, factor: &str) -> Result<ModelFit> {
        check_design(samples, factor)?;

        let normalized = self.load(&self.normalized_path, "loading normalized counts", counts)?;
        let transformed = self.load(&self.transformed_path, "loading transformed values", counts)?;
        let pca = principal_components(&transformed, self.ntop)?;

        Ok(ModelFit {
            size_factors: None,
            normalized,
            transformed,
            pca,
        })
    }
}
